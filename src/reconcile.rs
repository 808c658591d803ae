//! Attach a result element to its media package.
//!
//! Order matters: the element is added under its own id, its storage is moved
//! into the package namespace, and only then are flavor and tags rewritten.
//! If the move fails the element is removed again, so a relocation failure
//! leaves the package as it was before the attach began.
use crate::error::{chain_message, StepError, StepResult};
use crate::job::Relocator;
use crate::mediapackage::{Element, Flavor, MediaPackage};
use crate::tags::TagPatch;

/// Post-move rewrites applied to the attached element.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachOptions<'a> {
    /// Final path segment of the relocated file; keeps the source name when unset.
    pub output_filename: Option<&'a str>,
    pub target_flavor: Option<&'a Flavor>,
    pub tag_patch: Option<&'a TagPatch>,
}

pub fn attach(
    package: &mut MediaPackage,
    relocator: &dyn Relocator,
    artifact: Element,
    options: &AttachOptions<'_>,
) -> StepResult<Element> {
    if artifact.id.trim().is_empty() {
        return Err(StepError::attach("<unnamed>", "element has no identifier"));
    }
    if artifact.location.trim().is_empty() {
        return Err(StepError::attach(&artifact.id, "element has no storage location"));
    }
    if package.contains(&artifact.id) {
        return Err(StepError::attach(
            &artifact.id,
            format!("media package {} already holds an element with this id", package.id),
        ));
    }

    let element_id = artifact.id.clone();
    let source_location = artifact.location.clone();
    package.add(artifact);

    let moved = match relocator.move_to(
        &source_location,
        &package.id,
        &element_id,
        options.output_filename,
    ) {
        Ok(moved) => moved,
        Err(err) => {
            package.remove(&element_id);
            tracing::warn!(
                package = %package.id,
                element = %element_id,
                "relocation failed; element detached again"
            );
            return Err(StepError::RelocationFailed {
                package: package.id.clone(),
                element: element_id,
                message: chain_message(&err),
            });
        }
    };

    let element = package
        .get_mut(&element_id)
        .ok_or_else(|| StepError::attach(&element_id, "element vanished during attach"))?;
    element.location = moved;
    if let Some(flavor) = options.target_flavor {
        element.flavor = Some(flavor.clone());
    }
    if let Some(patch) = options.tag_patch {
        patch.apply(&mut element.tags);
    }
    tracing::debug!(
        element = %element.id,
        location = %element.location,
        "attached element"
    );
    Ok(element.clone())
}
