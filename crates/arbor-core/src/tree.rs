//! Domain tree contracts.
//!
//! The tree alternates between [`Resource`]s (single addressable items) and
//! [`Collection`]s (named containers of resources). A resource may own a
//! child collection, which makes it a hybrid node. Back-references
//! (`parent_collection`, `parent_resource`) are non-owning: implementations
//! typically hold a `Weak` and upgrade it on demand.

use crate::{Identity, Permission, Representation, Request, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Characters escaped when a name is placed in a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A single addressable node.
///
/// Permission predicates default to [`Permission::Allow`].
#[async_trait]
pub trait Resource: Send + Sync {
    /// Name, unique among siblings.
    fn name(&self) -> String;

    /// Whether the caller may read this resource.
    fn is_readable(&self, _identity: Option<&Identity>) -> Permission {
        Permission::Allow
    }

    /// Whether the caller may replace or update this resource.
    fn is_writable(&self, _identity: Option<&Identity>) -> Permission {
        Permission::Allow
    }

    /// Whether the caller may remove this resource.
    fn is_removable(&self, _identity: Option<&Identity>) -> Permission {
        Permission::Allow
    }

    /// The collection this resource lives in; `None` for the root.
    fn parent_collection(&self) -> Option<Arc<dyn Collection>>;

    /// The collection this resource owns, if it is a hybrid node.
    fn child_collection(&self) -> Option<Arc<dyn Collection>> {
        None
    }

    /// Current representation.
    async fn representation(&self, request: &Request) -> Result<Representation>;

    /// Replace the representation.
    async fn set_representation(&self, representation: Representation, request: &Request) -> Result<()>;

    /// Remove this resource from its collection.
    async fn remove(&self, request: &Request) -> Result<()>;
}

/// A named container of resources.
///
/// Permission predicates default to [`Permission::Allow`].
#[async_trait]
pub trait Collection: Send + Sync {
    /// Whether the caller may list this collection.
    fn is_browsable(&self, _identity: Option<&Identity>) -> Permission {
        Permission::Allow
    }

    /// Whether the caller may add, replace, or update children.
    fn is_writable(&self, _identity: Option<&Identity>) -> Permission {
        Permission::Allow
    }

    /// Whether the caller may remove the whole collection.
    fn is_removable(&self, _identity: Option<&Identity>) -> Permission {
        Permission::Allow
    }

    /// The resource owning this collection; `None` for a root collection.
    fn parent_resource(&self) -> Option<Arc<dyn Resource>>;

    /// Field that doubles as child identity in listings.
    fn name_attribute(&self) -> String {
        "name".to_string()
    }

    /// Expansion applied to listings when the request does not ask for one.
    fn listing_expansion(&self) -> Expansion {
        Expansion::None
    }

    /// Look up a child by name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if there is no such child.
    async fn child(&self, name: &str, request: &Request) -> Result<Arc<dyn Resource>>;

    /// Every child, honouring any parameters pushed down through
    /// [`ExtendedCollection`].
    async fn children(&self, request: &Request) -> Result<Vec<Arc<dyn Resource>>>;

    /// Create a child from a representation, with an explicit name when the
    /// caller chose one.
    async fn create_child(
        &self,
        representation: Representation,
        name: Option<&str>,
        request: &Request,
    ) -> Result<Arc<dyn Resource>>;

    /// Remove the collection and everything in it.
    async fn remove(&self, request: &Request) -> Result<()>;

    /// Listing query push-down, if supported.
    fn as_extended(&self) -> Option<&dyn ExtendedCollection> {
        None
    }

    /// Per-child listing representations, if supported.
    fn as_child_representation(&self) -> Option<&dyn ChildRepresentation> {
        None
    }
}

/// A collection able to apply listing parameters at the source.
///
/// Parameters are transient: they are set before [`Collection::children`]
/// and cleared by [`ExtendedCollection::reset_parameters`] right after it,
/// whether the fetch succeeded or not. Every setter returns whether the
/// collection took the parameter over.
pub trait ExtendedCollection: Send + Sync {
    /// Restrict the listing to the named children.
    fn set_names(&self, names: &[String]) -> bool;

    /// Filter children by a free-text phrase.
    fn set_search_phrase(&self, phrase: &str) -> bool;

    /// Sort children by a field.
    fn set_sort(&self, field: &str, order: SortOrder) -> bool;

    /// Return only `count` children starting at `offset`.
    fn set_slice(&self, offset: usize, count: Option<usize>) -> bool;

    /// Number of children matching the current parameters before slicing.
    fn total(&self) -> Option<usize> {
        None
    }

    /// Whether [`Self::total`] answers once children were fetched. Slices
    /// are only offered to collections that can report one.
    fn reports_total(&self) -> bool {
        false
    }

    /// Forget every parameter set for the current request.
    fn reset_parameters(&self);
}

/// A collection contributing a dedicated representation of each child to
/// listings.
#[async_trait]
pub trait ChildRepresentation: Send + Sync {
    /// Listing representation of `child`.
    async fn child_representation(
        &self,
        child: &Arc<dyn Resource>,
        request: &Request,
    ) -> Result<Representation>;
}

/// A node of the tree, tagged by the capability it is addressed through.
#[derive(Clone)]
pub enum Entity {
    /// Addressed as a single item.
    Resource(Arc<dyn Resource>),
    /// Addressed as a container.
    Collection(Arc<dyn Collection>),
}

impl Entity {
    /// The resource, if addressed as one.
    pub fn as_resource(&self) -> Option<&Arc<dyn Resource>> {
        match self {
            Entity::Resource(r) => Some(r),
            Entity::Collection(_) => None,
        }
    }

    /// The collection, if addressed as one.
    pub fn as_collection(&self) -> Option<&Arc<dyn Collection>> {
        match self {
            Entity::Collection(c) => Some(c),
            Entity::Resource(_) => None,
        }
    }

    /// Canonical tree path.
    pub fn path(&self) -> String {
        match self {
            Entity::Resource(r) => resource_path(r.as_ref()),
            Entity::Collection(c) => collection_path(c.as_ref()),
        }
    }

    /// Capability name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Resource(_) => "resource",
            Entity::Collection(_) => "collection",
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &self.kind())
            .field("path", &self.path())
            .finish()
    }
}

/// Canonical path of a resource: `/` for the root, `/a/b` below it.
pub fn resource_path(resource: &dyn Resource) -> String {
    let Some(mut collection) = resource.parent_collection() else {
        return "/".to_string();
    };

    let mut segments = vec![resource.name()];
    while let Some(owner) = collection.parent_resource() {
        let Some(parent) = owner.parent_collection() else {
            break;
        };
        segments.push(owner.name());
        collection = parent;
    }

    segments
        .iter()
        .rev()
        .fold(String::new(), |mut path, segment| {
            path.push('/');
            path.extend(utf8_percent_encode(segment, SEGMENT));
            path
        })
}

/// Canonical path of a collection: its owner's path with a trailing `/`.
pub fn collection_path(collection: &dyn Collection) -> String {
    match collection.parent_resource() {
        None => "/".to_string(),
        Some(owner) => {
            let mut path = resource_path(owner.as_ref());
            if !path.ends_with('/') {
                path.push('/');
            }
            path
        }
    }
}

/// How much of each child's representation a listing merges in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Expansion {
    /// Only the stub fields.
    #[default]
    None,
    /// Every non-reserved field.
    Full,
    /// Only the named fields.
    Fields(Vec<String>),
}

impl Expansion {
    /// Whether anything is merged.
    pub fn is_requested(&self) -> bool {
        !matches!(self, Expansion::None)
    }

    /// Field filter, `None` meaning every field.
    pub fn only(&self) -> Option<&[String]> {
        match self {
            Expansion::Fields(fields) => Some(fields),
            _ => None,
        }
    }
}

impl FromStr for Expansion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "none" | "false" | "0" => Expansion::None,
            "full" | "true" | "1" | "*" => Expansion::Full,
            fields => Expansion::Fields(
                fields
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl FromStr for SortOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(crate::Error::ClientError(format!("unknown sort order '{}'", other))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "asc"),
            SortOrder::Descending => write!(f, "desc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, Weak};

    struct Node {
        name: String,
        parent: Option<Weak<Folder>>,
        children: Option<Arc<Folder>>,
    }

    struct Folder {
        owner: Option<Weak<Node>>,
    }

    #[async_trait]
    impl Resource for Node {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn parent_collection(&self) -> Option<Arc<dyn Collection>> {
            let parent = self.parent.as_ref()?.upgrade()?;
            Some(parent)
        }

        fn child_collection(&self) -> Option<Arc<dyn Collection>> {
            self.children.clone().map(|c| c as Arc<dyn Collection>)
        }

        async fn representation(&self, _request: &Request) -> Result<Representation> {
            Ok(Representation::new())
        }

        async fn set_representation(&self, _r: Representation, _request: &Request) -> Result<()> {
            Ok(())
        }

        async fn remove(&self, _request: &Request) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Collection for Folder {
        fn parent_resource(&self) -> Option<Arc<dyn Resource>> {
            let owner = self.owner.as_ref()?.upgrade()?;
            Some(owner)
        }

        async fn child(&self, name: &str, _request: &Request) -> Result<Arc<dyn Resource>> {
            Err(crate::Error::not_found(name))
        }

        async fn children(&self, _request: &Request) -> Result<Vec<Arc<dyn Resource>>> {
            Ok(Vec::new())
        }

        async fn create_child(
            &self,
            _representation: Representation,
            name: Option<&str>,
            _request: &Request,
        ) -> Result<Arc<dyn Resource>> {
            Err(crate::Error::not_allowed(name.unwrap_or_default()))
        }

        async fn remove(&self, _request: &Request) -> Result<()> {
            Ok(())
        }
    }

    /// Builds `root -> {root}/ -> a -> a/ -> "b c"`.
    fn chain(keep: &Mutex<Vec<Arc<Node>>>) -> Arc<Node> {
        let root = Arc::new_cyclic(|me| Node {
            name: String::new(),
            parent: None,
            children: Some(Arc::new(Folder {
                owner: Some(me.clone()),
            })),
        });
        let root_folder = root.children.clone().unwrap();
        let a = Arc::new_cyclic(|me| Node {
            name: "a".into(),
            parent: Some(Arc::downgrade(&root_folder)),
            children: Some(Arc::new(Folder {
                owner: Some(me.clone()),
            })),
        });
        let a_folder = a.children.clone().unwrap();
        let b = Arc::new(Node {
            name: "b c".into(),
            parent: Some(Arc::downgrade(&a_folder)),
            children: None,
        });
        keep.lock().unwrap().extend([root, a]);
        b
    }

    #[test]
    fn test_tree_paths() {
        let keep = Mutex::new(Vec::new());
        let leaf = chain(&keep);
        assert_eq!(resource_path(leaf.as_ref()), "/a/b%20c");

        let a_folder = leaf.parent_collection().unwrap();
        assert_eq!(collection_path(a_folder.as_ref()), "/a/");

        let a = a_folder.parent_resource().unwrap();
        assert_eq!(resource_path(a.as_ref()), "/a");

        let root_folder = a.parent_collection().unwrap();
        assert_eq!(collection_path(root_folder.as_ref()), "/");
        assert_eq!(Entity::Collection(root_folder).path(), "/");
    }

    #[test]
    fn test_root_collection_path() {
        let folder: Arc<dyn Collection> = Arc::new(Folder { owner: None });
        assert_eq!(collection_path(folder.as_ref()), "/");
    }

    #[test]
    fn test_expansion_parsing() {
        assert_eq!("full".parse::<Expansion>().unwrap(), Expansion::Full);
        assert_eq!("".parse::<Expansion>().unwrap(), Expansion::None);
        assert_eq!(
            "title, body".parse::<Expansion>().unwrap(),
            Expansion::Fields(vec!["title".into(), "body".into()])
        );
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
