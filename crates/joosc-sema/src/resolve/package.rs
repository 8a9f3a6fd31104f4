//! The global package tree assembled from every compilation unit's package
//! declaration and top-level type.

use joosc_ast::NodeID;
use rustc_hash::FxHashMap;

/// Identifies one node of the package tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PkgId(u32);

/// What a name resolves to inside a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PkgMember {
    Package(PkgId),
    Type(NodeID),
}

#[derive(Debug, Default)]
struct PkgNode {
    members: FxHashMap<String, PkgMember>,
}

/// Tree of packages and the top-level types declared in each, built once
/// from every parsed compilation unit before name resolution proper begins.
#[derive(Debug)]
pub struct PackageTree {
    nodes: Vec<PkgNode>,
    root: PkgId,
}

impl Default for PackageTree {
    fn default() -> Self { Self::new() }
}

impl PackageTree {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![PkgNode::default()], root: PkgId(0) }
    }

    #[must_use]
    pub const fn root(&self) -> PkgId { self.root }

    /// Finds or creates the package named by `path` (dot-separated segments),
    /// starting at the root.
    pub fn intern_package(&mut self, path: &[String]) -> PkgId {
        let mut current = self.root;
        for segment in path {
            current = self.child_package(current, segment);
        }
        current
    }

    fn child_package(&mut self, parent: PkgId, segment: &str) -> PkgId {
        if let Some(PkgMember::Package(id)) = self.nodes[parent.0 as usize].members.get(segment) {
            return *id;
        }
        let id = PkgId(u32::try_from(self.nodes.len()).expect("fewer than u32::MAX packages"));
        self.nodes.push(PkgNode::default());
        self.nodes[parent.0 as usize].members.insert(segment.to_string(), PkgMember::Package(id));
        id
    }

    /// Registers a top-level type under the package named by `package_path`.
    /// Returns `false` if a member of that name already exists (a duplicate
    /// top-level type, reported by the caller as a diagnostic).
    pub fn declare_type(&mut self, package_path: &[String], simple_name: &str, decl: NodeID) -> bool {
        let pkg = self.intern_package(package_path);
        let node = &mut self.nodes[pkg.0 as usize];
        if node.members.contains_key(simple_name) {
            return false;
        }
        node.members.insert(simple_name.to_string(), PkgMember::Type(decl));
        true
    }

    /// Looks up a direct member of `pkg` by simple name.
    #[must_use]
    pub fn lookup(&self, pkg: PkgId, name: &str) -> Option<PkgMember> {
        self.nodes[pkg.0 as usize].members.get(name).copied()
    }

    /// Resolves a full dotted path from the root, e.g. `["java", "lang",
    /// "Object"]`, returning the type it names if every segment exists.
    #[must_use]
    pub fn resolve_path(&self, path: &[String]) -> Option<NodeID> {
        let (last, prefix) = path.split_last()?;
        let pkg = self.find_package(prefix)?;
        match self.lookup(pkg, last)? {
            PkgMember::Type(decl) => Some(decl),
            PkgMember::Package(_) => None,
        }
    }

    /// Walks `path` from the root through nested packages only, without
    /// creating any. `&[]` resolves to the root (the unnamed package).
    #[must_use]
    pub fn find_package(&self, path: &[String]) -> Option<PkgId> {
        let mut pkg = self.root;
        for segment in path {
            match self.lookup(pkg, segment)? {
                PkgMember::Package(id) => pkg = id,
                PkgMember::Type(_) => return None,
            }
        }
        Some(pkg)
    }
}

#[cfg(test)]
mod tests {
    use joosc_ast::NodeID;

    use super::*;

    #[test]
    fn declares_and_resolves_a_nested_type() {
        let mut tree = PackageTree::new();
        let decl = NodeID::new(0, 1);
        assert!(tree.declare_type(&["java".into(), "lang".into()], "Object", decl));
        assert_eq!(tree.resolve_path(&["java".into(), "lang".into(), "Object".into()]), Some(decl));
    }

    #[test]
    fn duplicate_top_level_type_is_rejected() {
        let mut tree = PackageTree::new();
        let a = NodeID::new(0, 1);
        let b = NodeID::new(1, 1);
        assert!(tree.declare_type(&[], "Main", a));
        assert!(!tree.declare_type(&[], "Main", b));
    }

    #[test]
    fn unnamed_package_is_the_root() {
        let mut tree = PackageTree::new();
        let decl = NodeID::new(0, 1);
        assert!(tree.declare_type(&[], "Main", decl));
        assert_eq!(tree.find_package(&[]), Some(tree.root()));
        assert_eq!(tree.resolve_path(&["Main".into()]), Some(decl));
    }
}
