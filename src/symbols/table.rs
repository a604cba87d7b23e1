use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;

use crate::diagnostics::{Flag, Location};
use crate::operators::{OpCode, OpKind};
use crate::plugins::PluginRegistry;

use super::names::{split_dotted, TypeCnstName, TYPE_CNST_PREFIX};
use super::namespace::{NamespaceId, NamespaceTree};
use super::size_expr::SizeExpr;
use super::{
    BaseOpSymb, BaseSortKind, ConSymb, MapSymb, Symbol, TypeAtom, UnnSymb, UserCnstKind,
    UserCnstSymb, UserSortSymb,
};

/// The name of the derived constant for truth.
pub const TRUE_NAME: &str = "TRUE";
/// The name of the derived constant for falsehood.
pub const FALSE_NAME: &str = "FALSE";
/// The name of the union of both truth values.
pub const BOOLEAN_NAME: &str = "Boolean";

/// Owns the namespace tree, the built-in symbols and the id space of a program.
pub struct SymbolTable {
    program: String,
    namespaces: NamespaceTree,
    ids: Arc<AtomicUsize>,
    sorts: BTreeMap<BaseSortKind, Symbol>,
    ops: BTreeMap<OpCode, Symbol>,
    plugins: Arc<PluginRegistry>,
}

impl SymbolTable {
    /// Creates a table for `program` with the built-in sorts, the operators of [OpKind] and of every plugin
    /// in `plugins`, and the root declarations `TRUE`, `FALSE` and `Boolean`.
    pub fn new(program: &str, plugins: Arc<PluginRegistry>) -> SymbolTable {
        let ids = Arc::new(AtomicUsize::new(0));
        let next = || ids.fetch_add(1, Ordering::SeqCst);

        let sorts = BaseSortKind::ALL
            .iter()
            .map(|k| (*k, Symbol::base_sort(*k, next())))
            .collect::<BTreeMap<_, _>>();

        let mut ops = OpKind::ALL
            .iter()
            .map(|k| {
                let code = OpCode::Builtin(*k);
                (
                    code,
                    Symbol::BaseOp(BaseOpSymb::new(code, next(), k.arity(), k.get_name())),
                )
            })
            .collect::<BTreeMap<_, _>>();

        for plugin in plugins.get_plugins().into_iter() {
            let code = OpCode::Plugin(plugin.get_id());
            ops.insert(
                code,
                Symbol::BaseOp(BaseOpSymb::new(
                    code,
                    next(),
                    plugin.arity(),
                    plugin.get_name(),
                )),
            );
        }

        let mut table = SymbolTable {
            program: program.to_owned(),
            namespaces: NamespaceTree::new(),
            ids,
            sorts,
            ops,
            plugins,
        };
        table.declare_root_symbols();
        table
    }

    fn declare_root_symbols(&mut self) {
        let root = self.root();
        let mut flags = Vec::new();
        for name in [TRUE_NAME, FALSE_NAME].iter() {
            let cnst = UserCnstSymb::new(name, UserCnstKind::Derived, false);
            self.add(root, Symbol::UserCnst(Arc::new(cnst)), Location::default(), &mut flags, None);
        }
        self.declare_union(
            root,
            BOOLEAN_NAME,
            vec![TypeAtom::name(TRUE_NAME), TypeAtom::name(FALSE_NAME)],
            Location::default(),
            &mut flags,
        );
        for k in BaseSortKind::ALL.iter() {
            self.add_type_constants(root, k.get_name(), 0);
        }
        assert!(flags.is_empty(), "root declarations are well formed");
    }

    /// The program name used in diagnostics.
    pub fn get_program(&self) -> &str {
        &self.program
    }

    /// The namespace tree.
    pub fn get_namespaces(&self) -> &NamespaceTree {
        &self.namespaces
    }

    /// Mutable access to the namespace tree, for callers that mint symbols themselves.
    pub fn get_namespaces_mut(&mut self) -> &mut NamespaceTree {
        &mut self.namespaces
    }

    /// The root namespace.
    pub fn root(&self) -> NamespaceId {
        self.namespaces.root()
    }

    /// The plugin registry the operator symbols were taken from.
    pub fn get_plugins(&self) -> &Arc<PluginRegistry> {
        &self.plugins
    }

    /// Allocates a fresh symbol id.
    pub fn allocate_id(&self) -> usize {
        self.ids.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn id_counter(&self) -> Arc<AtomicUsize> {
        self.ids.clone()
    }

    /// The symbol of an operator.
    pub fn get_op_symbol(&self, code: OpCode) -> Option<&Symbol> {
        self.ops.get(&code)
    }

    /// Every operator symbol.
    pub fn get_op_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.ops.values()
    }

    /// The symbol of a base sort.
    pub fn get_sort_symbol(&self, kind: BaseSortKind) -> &Symbol {
        &self.sorts[&kind]
    }

    /// Resolves a (possibly dotted) name or a type constant encoding from the root.
    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        self.resolve_from(self.root(), name)
    }

    /// Resolves a name the way it is seen from inside `ns`: first relative to `ns`, then to each enclosing
    /// namespace, finally as a base sort.
    pub fn resolve_from(&self, ns: NamespaceId, name: &str) -> Option<Symbol> {
        if name.starts_with(TYPE_CNST_PREFIX) {
            let decoded = TypeCnstName::parse(name)?;
            let target = self.resolve_from(ns, &decoded.name)?;
            return self.get_type_constant(&target, decoded.index);
        }

        let parts = split_dotted(name);
        let (last, path) = parts.split_last()?;
        for anc in self.namespaces.ancestors(ns) {
            if let Some(found) = self
                .namespaces
                .descend(anc, path)
                .and_then(|n| self.namespaces.try_get_symbol(n, last))
            {
                return Some(found.clone());
            }
        }
        BaseSortKind::from_name(name).map(|k| self.get_sort_symbol(k).clone())
    }

    /// The type constant `#Name` or `#Name[index]` of a type symbol.
    pub fn get_type_constant(&self, target: &Symbol, index: Option<usize>) -> Option<Symbol> {
        let (ns, name) = match target {
            Symbol::BaseSort(s) => (self.root(), s.kind.get_name().to_owned()),
            Symbol::UserSort(s) => {
                let data = s.get_data_symbol()?;
                return self.get_type_constant(&data, index);
            }
            _ => {
                let reg = target.user_info()?.get_registration()?;
                (reg.namespace, target.name().into_owned())
            }
        };
        let encoded = TypeCnstName { name, index }.to_string();
        self.namespaces.try_get_symbol(ns, &encoded).cloned()
    }

    /// The derived sorts of every constructor or map declaring a field labeled `label`.
    pub fn inverse_label_lookup(&self, label: &str) -> Vec<Arc<UserSortSymb>> {
        self.namespaces
            .all_symbols()
            .into_iter()
            .filter_map(|(_, s)| {
                let data = s.data_decl()?;
                data.label_index(label)?;
                data.get_sort().cloned()
            })
            .collect()
    }

    /// Maps a namespace below the top-level namespace `from` to the namespace with the same path below `to`.
    pub fn relabel(&self, from: &str, to: &str, ns: NamespaceId) -> Option<NamespaceId> {
        let path = self.namespaces.split_prefix(ns, self.root())?;
        let (first, rest) = path.split_first()?;
        if first != from {
            return None;
        }
        let target = self.namespaces.try_get_child(self.root(), to)?;
        let rest = rest.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        self.namespaces.descend(target, &rest)
    }

    fn add(
        &mut self,
        ns: NamespaceId,
        symbol: Symbol,
        loc: Location,
        flags: &mut Vec<Flag>,
        size: Option<SizeExpr>,
    ) -> bool {
        let ids = self.ids.clone();
        self.namespaces.try_add_symbol(
            ns,
            symbol,
            &mut || ids.fetch_add(1, Ordering::SeqCst),
            loc,
            &self.program,
            flags,
            size,
        )
    }

    fn add_type_constants(&mut self, ns: NamespaceId, name: &str, arity: usize) {
        let encodings = std::iter::once(TypeCnstName::new(name))
            .chain((0..arity).map(|i| TypeCnstName::with_index(name, i)));
        let mut flags = Vec::new();
        for enc in encodings {
            let encoded = enc.to_string();
            if self.namespaces.try_get_symbol(ns, &encoded).is_none() {
                let cnst = UserCnstSymb::new(&encoded, UserCnstKind::TypeCnst, true);
                self.add(ns, Symbol::UserCnst(Arc::new(cnst)), Location::default(), &mut flags, None);
            }
        }
        debug_assert!(flags.is_empty());
    }

    fn declare(
        &mut self,
        ns: NamespaceId,
        symbol: Symbol,
        loc: Location,
        flags: &mut Vec<Flag>,
        size: Option<SizeExpr>,
    ) -> Option<Symbol> {
        let name = symbol.name().into_owned();
        let arity = symbol.arity();
        let is_type = !matches!(symbol, Symbol::UserCnst(_));
        if !self.add(ns, symbol, loc, flags, size) {
            return None;
        }
        if is_type {
            self.add_type_constants(ns, &name, arity);
        }
        debug!("declared {} in {:?}", name, ns);
        self.namespaces.try_get_symbol(ns, &name).cloned()
    }

    /// Creates or returns the child namespace `name` of `ns`.
    pub fn add_namespace(
        &mut self,
        ns: NamespaceId,
        name: &str,
        loc: Location,
        flags: &mut Vec<Flag>,
    ) -> Option<NamespaceId> {
        self.namespaces
            .try_add_namespace(ns, name, loc, &self.program, flags)
    }

    /// Declares a user constant.
    pub fn declare_constant(
        &mut self,
        ns: NamespaceId,
        name: &str,
        loc: Location,
        flags: &mut Vec<Flag>,
    ) -> Option<Symbol> {
        let cnst = UserCnstSymb::new(name, UserCnstKind::New, false);
        self.declare(ns, Symbol::UserCnst(Arc::new(cnst)), loc, flags, None)
    }

    /// Declares (a partial definition of) a union. Returns the merged union.
    pub fn declare_union(
        &mut self,
        ns: NamespaceId,
        name: &str,
        components: Vec<TypeAtom>,
        loc: Location,
        flags: &mut Vec<Flag>,
    ) -> Option<Symbol> {
        let unn = UnnSymb::new(name, components);
        self.declare(ns, Symbol::Unn(Arc::new(unn)), loc, flags, None)
    }

    /// Declares a constructor together with its type constants.
    pub fn declare_constructor(
        &mut self,
        ns: NamespaceId,
        con: ConSymb,
        size: Option<SizeExpr>,
        loc: Location,
        flags: &mut Vec<Flag>,
    ) -> Option<Symbol> {
        self.declare(ns, Symbol::Con(Arc::new(con)), loc, flags, size)
    }

    /// Declares a map together with its type constants.
    pub fn declare_map(
        &mut self,
        ns: NamespaceId,
        map: MapSymb,
        size: Option<SizeExpr>,
        loc: Location,
        flags: &mut Vec<Flag>,
    ) -> Option<Symbol> {
        self.declare(ns, Symbol::Map(Arc::new(map)), loc, flags, size)
    }

    /// Mints a fresh symbolic constant in `ns`.
    pub fn add_fresh_symbolic_constant(&mut self, ns: NamespaceId) -> Symbol {
        let id = self.allocate_id();
        self.namespaces.add_fresh_symbolic_constant(ns, id)
    }

    /// Mints a fresh anonymous model constant in `ns`.
    pub fn add_anon_model_constant(&mut self, ns: NamespaceId) -> Symbol {
        let id = self.allocate_id();
        self.namespaces.add_anon_model_constant(ns, id)
    }
}
