use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::debug;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::{Bfs, Walker};

use crate::diagnostics::{messages, ErrorCode, Flag, Location};

use super::names::{is_identifier, join_dotted};
use super::size_expr::SizeExpr;
use super::{
    is_compatible_definition, DataOwner, Registration, Symbol, UnnSymb, UserCnstKind,
    UserCnstSymb, UserSortSymb,
};

/// Addresses a namespace inside its [NamespaceTree].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespaceId(NodeIndex);

/// A lexical scope.
#[derive(Debug)]
pub struct Namespace {
    name: String,
    full_name: String,
    depth: usize,
    parent: Option<NamespaceId>,
    symbols: BTreeMap<String, Symbol>,
    children: BTreeMap<String, NamespaceId>,
}

impl Namespace {
    /// The local name, empty for the root.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// The dot-joined name from the root.
    pub fn get_full_name(&self) -> &str {
        &self.full_name
    }

    /// The distance from the root.
    pub fn get_depth(&self) -> usize {
        self.depth
    }

    /// The enclosing namespace.
    pub fn get_parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    /// The symbols declared directly in this namespace.
    pub fn get_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// The direct children.
    pub fn get_children(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        self.children.values().copied()
    }
}

/// The namespace tree. Nodes live in a graph arena with edges from parent to child, so parents are
/// referred to by index and never owned.
///
/// Mutation takes `&mut self`; concurrent compilation phases must serialize declarations themselves.
#[derive(Debug)]
pub struct NamespaceTree {
    graph: Graph<Namespace, ()>,
    root: NamespaceId,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        NamespaceTree::new()
    }
}

impl NamespaceTree {
    /// Creates a tree holding only the root.
    pub fn new() -> NamespaceTree {
        let mut graph = Graph::new();
        let root = graph.add_node(Namespace {
            name: String::new(),
            full_name: String::new(),
            depth: 0,
            parent: None,
            symbols: BTreeMap::new(),
            children: BTreeMap::new(),
        });
        NamespaceTree {
            graph,
            root: NamespaceId(root),
        }
    }

    /// The root namespace.
    pub fn root(&self) -> NamespaceId {
        self.root
    }

    /// Access to a namespace.
    pub fn get(&self, ns: NamespaceId) -> &Namespace {
        &self.graph[ns.0]
    }

    /// Every namespace, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        Bfs::new(&self.graph, self.root.0)
            .iter(&self.graph)
            .map(NamespaceId)
    }

    /// Every symbol of the tree together with its namespace.
    pub fn all_symbols(&self) -> Vec<(NamespaceId, Symbol)> {
        self.iter()
            .flat_map(|ns| {
                self.get(ns)
                    .get_symbols()
                    .map(move |s| (ns, s.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Looks a symbol up by local name.
    pub fn try_get_symbol(&self, ns: NamespaceId, name: &str) -> Option<&Symbol> {
        self.get(ns).symbols.get(name)
    }

    /// Looks a child up by local name.
    pub fn try_get_child(&self, ns: NamespaceId, name: &str) -> Option<NamespaceId> {
        self.get(ns).children.get(name).copied()
    }

    /// Returns the child `name`, creating it if it does not exist. An illegal identifier is reported as
    /// [ErrorCode::BadId] and leaves the tree unchanged.
    pub fn try_add_namespace(
        &mut self,
        ns: NamespaceId,
        name: &str,
        loc: Location,
        program: &str,
        flags: &mut Vec<Flag>,
    ) -> Option<NamespaceId> {
        if let Some(child) = self.try_get_child(ns, name) {
            return Some(child);
        }

        if !is_identifier(name) {
            flags.push(Flag::error(
                loc,
                messages::bad_id(name, "namespace"),
                ErrorCode::BadId,
                program,
            ));
            return None;
        }

        Some(self.insert_child(ns, name))
    }

    fn insert_child(&mut self, ns: NamespaceId, name: &str) -> NamespaceId {
        let parent = self.get(ns);
        let child = Namespace {
            name: name.to_owned(),
            full_name: join_dotted(vec![parent.full_name.as_str(), name]),
            depth: parent.depth + 1,
            parent: Some(ns),
            symbols: BTreeMap::new(),
            children: BTreeMap::new(),
        };
        let idx = NamespaceId(self.graph.add_node(child));
        self.graph.add_edge(ns.0, idx.0, ());
        self.graph[ns.0].children.insert(name.to_owned(), idx);
        idx
    }

    fn registration(&self, ns: NamespaceId, name: &str, id: usize) -> Registration {
        Registration {
            id,
            namespace: ns,
            full_name: join_dotted(vec![self.get(ns).full_name.as_str(), name]),
        }
    }

    /// Adds a user symbol. A fresh name is validated (unless auto generated), given an id from `id_getter`
    /// and, for constructors and maps, linked to a derived sort with its own id and the optional `size`.
    ///
    /// An existing symbol of the same name is merged with a compatible redefinition. Incompatible
    /// redefinitions raise [ErrorCode::DuplicateDefs], keep the first definition, and return false.
    #[allow(clippy::too_many_arguments)]
    pub fn try_add_symbol(
        &mut self,
        ns: NamespaceId,
        symbol: Symbol,
        id_getter: &mut dyn FnMut() -> usize,
        loc: Location,
        program: &str,
        flags: &mut Vec<Flag>,
        size: Option<SizeExpr>,
    ) -> bool {
        let info = match symbol.user_info() {
            Some(info) => info,
            None => panic!("only user symbols are declared in namespaces"),
        };
        let name = info.get_name().to_owned();

        if let Some(existing) = self.try_get_symbol(ns, &name).cloned() {
            if !is_compatible_definition(&existing, &symbol) {
                flags.push(Flag::error(
                    loc,
                    messages::duplicate_def(&name, self.get(ns).get_full_name()),
                    ErrorCode::DuplicateDefs,
                    program,
                ));
                return false;
            }

            if let (Symbol::Unn(old), Symbol::Unn(new)) = (&existing, &symbol) {
                let merged = Symbol::Unn(Arc::new(old.merge(new)));
                debug!("merged partial definitions of union {}", merged);
                self.graph[ns.0].symbols.insert(name, merged);
            }
            return true;
        }

        if !info.is_auto_generated() && !is_identifier(&name) {
            flags.push(Flag::error(
                loc,
                messages::bad_id(&name, "symbol"),
                ErrorCode::BadId,
                program,
            ));
            return false;
        }

        info.register(self.registration(ns, &name, id_getter()));

        let owner = match &symbol {
            Symbol::Con(c) => Some((c.data(), DataOwner::Con(Arc::downgrade(c)))),
            Symbol::Map(m) => Some((m.data(), DataOwner::Map(Arc::downgrade(m)))),
            _ => None,
        };
        if let Some((data, owner)) = owner {
            let sort = Arc::new(UserSortSymb::new(&name, owner, size));
            sort.info()
                .register(self.registration(ns, &name, id_getter()));
            data.link_sort(sort);
        }

        self.graph[ns.0].symbols.insert(name, symbol);
        true
    }

    /// The deepest common ancestor of two namespaces.
    pub fn try_get_prefix(&self, a: NamespaceId, b: NamespaceId) -> Option<NamespaceId> {
        let (shallow, deep) = if self.get(a).depth <= self.get(b).depth {
            (a, b)
        } else {
            (b, a)
        };

        let ancestors = self.ancestors(shallow).collect::<HashSet<_>>();
        self.ancestors(deep).find(|n| ancestors.contains(n))
    }

    /// The namespace itself followed by its ancestors up to the root.
    pub fn ancestors(&self, ns: NamespaceId) -> impl Iterator<Item = NamespaceId> + '_ {
        std::iter::successors(Some(ns), move |n| self.get(*n).parent)
    }

    /// Strips the trailing `suffix` names off the path of `ns`, returning the remaining prefix namespace.
    /// `None` if the path of `ns` does not end with `suffix`.
    pub fn split_suffix(&self, ns: NamespaceId, suffix: &[&str]) -> Option<NamespaceId> {
        let mut curr = ns;
        for name in suffix.iter().rev() {
            let node = self.get(curr);
            if node.name != *name {
                return None;
            }
            curr = node.parent?;
        }
        Some(curr)
    }

    /// The names leading from `prefix` down to `ns`. `None` if `prefix` is not an ancestor of `ns`.
    pub fn split_prefix(&self, ns: NamespaceId, prefix: NamespaceId) -> Option<Vec<String>> {
        let mut names = Vec::new();
        for n in self.ancestors(ns) {
            if n == prefix {
                names.reverse();
                return Some(names);
            }
            names.push(self.get(n).name.clone());
        }
        None
    }

    /// Resolves a path of child names starting at `ns`.
    pub fn descend(&self, ns: NamespaceId, path: &[&str]) -> Option<NamespaceId> {
        path.iter()
            .try_fold(ns, |curr, name| self.try_get_child(curr, name))
    }

    /// True if `name` is declared in `ns` or any namespace below it.
    pub fn exists_symbol(&self, ns: NamespaceId, name: &str) -> bool {
        let node = self.get(ns);
        node.symbols.contains_key(name)
            || node.children.values().any(|c| self.exists_symbol(*c, name))
    }

    fn add_constant_unchecked(
        &mut self,
        ns: NamespaceId,
        name: String,
        kind: UserCnstKind,
        id: usize,
    ) -> Symbol {
        assert!(
            !self.get(ns).symbols.contains_key(&name),
            "constant {} already exists in {}",
            name,
            self.get(ns).full_name
        );
        let cnst = UserCnstSymb::new(&name, kind, true);
        cnst.info().register(self.registration(ns, &name, id));
        let symbol = Symbol::UserCnst(Arc::new(cnst));
        self.graph[ns.0].symbols.insert(name, symbol.clone());
        symbol
    }

    /// Mints a symbolic constant named after its id. The name must not exist yet.
    pub fn add_fresh_symbolic_constant(&mut self, ns: NamespaceId, id: usize) -> Symbol {
        self.add_constant_unchecked(ns, format!("~sc{}", id), UserCnstKind::Symbolic, id)
    }

    /// Mints an anonymous constant for a model. The name must not exist yet.
    pub fn add_anon_model_constant(&mut self, ns: NamespaceId, id: usize) -> Symbol {
        self.add_constant_unchecked(ns, format!("~anon{}", id), UserCnstKind::New, id)
    }

    /// Adds a named model constant without validation. The name must not exist yet.
    pub fn add_model_constant(&mut self, ns: NamespaceId, name: &str, id: usize) -> Symbol {
        self.add_constant_unchecked(ns, name.to_owned(), UserCnstKind::New, id)
    }

    /// The union declared as `name`, with all partial definitions merged.
    pub(crate) fn get_union(&self, ns: NamespaceId, name: &str) -> Option<Arc<UnnSymb>> {
        match self.try_get_symbol(ns, name) {
            Some(Symbol::Unn(u)) => Some(u.clone()),
            _ => None,
        }
    }
}
