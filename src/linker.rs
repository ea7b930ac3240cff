//! Maps resource identities onto content paths. Exact inverse of the
//! patterns registered in [`crate::router`].

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use smallvec::SmallVec;

use crate::reference::{Kind, ObjectRef};

// Everything that would break a path segment or an href attribute. `/` and
// `%` are included so encoded names survive the split/decode round trip.
const SEGMENT_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'`')
    .add(b'<')
    .add(b'>')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Pure path construction rooted at the host-supplied module prefix.
#[derive(Clone, Debug, Default)]
pub struct Linker {
    root: String,
}

impl Linker {
    pub fn new(root: impl Into<String>) -> Self {
        Linker { root: root.into() }
    }

    /// Content path for a resource identity, optionally nested under the
    /// owning context (only revisions nest, under services or configurations).
    pub fn path(&self, target: &ObjectRef, context: Option<&ObjectRef>) -> String {
        let mut segments: SmallVec<[&str; 4]> = SmallVec::new();

        match target.serving_kind() {
            None => {}
            Some(Kind::Revision) => {
                let owner = context.and_then(|ctx| {
                    let kind = ctx.serving_kind()?;
                    let name = ctx.name.as_deref()?;
                    kind.owns_revisions().then_some((kind, name))
                });
                debug_assert!(
                    context.is_none() || owner.is_some(),
                    "revision context must be a named service or configuration"
                );
                if let Some((kind, name)) = owner {
                    segments.push(kind.collection());
                    segments.push(name);
                }
                segments.push(Kind::Revision.collection());
                if let Some(name) = target.name.as_deref() {
                    segments.push(name);
                }
            }
            Some(kind) => {
                debug_assert!(context.is_none(), "only revisions take a context");
                segments.push(kind.collection());
                if let Some(name) = target.name.as_deref() {
                    segments.push(name);
                }
            }
        }

        let mut path = self.root.clone();
        if segments.is_empty() && path.is_empty() {
            return "/".to_string();
        }
        for segment in segments {
            path.push('/');
            path.extend(utf8_percent_encode(segment, SEGMENT_ENCODE));
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::NEW_NAME;

    fn linker() -> Linker {
        Linker::new("")
    }

    #[test]
    fn root_path_for_bare_api_version() {
        assert_eq!(linker().path(&ObjectRef::root(), None), "/");
        assert_eq!(
            Linker::new("/knative").path(&ObjectRef::root(), None),
            "/knative"
        );
    }

    #[test]
    fn collection_and_detail_paths() {
        let linker = linker();
        assert_eq!(linker.path(&ObjectRef::collection(Kind::Service), None), "/services");
        assert_eq!(
            linker.path(&ObjectRef::named(Kind::Service, "greeter"), None),
            "/services/greeter"
        );
        assert_eq!(
            linker.path(&ObjectRef::named(Kind::Route, "greeter"), None),
            "/routes/greeter"
        );
    }

    #[test]
    fn new_resource_path_is_literal() {
        assert_eq!(
            linker().path(&ObjectRef::named(Kind::Service, NEW_NAME), None),
            "/services/_new"
        );
    }

    #[test]
    fn revision_nests_under_context() {
        let linker = linker();
        let service = ObjectRef::named(Kind::Service, "greeter");
        let configuration = ObjectRef::named(Kind::Configuration, "greeter");
        assert_eq!(
            linker.path(&ObjectRef::collection(Kind::Revision), Some(&service)),
            "/services/greeter/revisions"
        );
        assert_eq!(
            linker.path(
                &ObjectRef::named(Kind::Revision, "greeter-00001"),
                Some(&configuration)
            ),
            "/configurations/greeter/revisions/greeter-00001"
        );
    }

    #[test]
    fn revision_without_context_uses_flat_root() {
        assert_eq!(
            linker().path(&ObjectRef::named(Kind::Revision, "greeter-00001"), None),
            "/revisions/greeter-00001"
        );
    }

    #[test]
    fn prefix_carries_through() {
        let linker = Linker::new("/knative");
        assert_eq!(
            linker.path(&ObjectRef::named(Kind::Configuration, "greeter"), None),
            "/knative/configurations/greeter"
        );
    }

    #[test]
    fn names_are_segment_encoded() {
        assert_eq!(
            linker().path(&ObjectRef::named(Kind::Service, "a/b c"), None),
            "/services/a%2Fb%20c"
        );
    }
}
