//! Externally supplied numeric operators. A plugin declares a name, argument sorts, a return sort and a
//! function on rationals; registration wraps it into the validator, evaluator and approximation
//! interface every built-in operator has.

use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use log::{info, warn};
use num_rational::BigRational;
use once_cell::sync::OnceCell;

use crate::diagnostics::Flag;
use crate::operators::validate::validate_shape;
use crate::operators::{
    AppSyntax, ArgShape, Bindable, EvalContext, OpKind, Operator, PluginOpId,
};
use crate::symbols::BaseSortKind;
use crate::terms::{Term, TermIndex};

use self::loader::{ManifestLoader, PluginLoader};

/// Plugin discovery.
pub mod loader;

/// Plugins shipped with the crate.
pub mod stock;

/// The environment variable listing plugin directories, separated by `;`.
pub const PLUGIN_DIRS_VAR: &str = "FORMULA_PLUGINS";

/// The directory next to the executable searched when [PLUGIN_DIRS_VAR] is not set.
pub const DEFAULT_PLUGIN_DIR: &str = "Plugins";

/// A numeric operator supplied from outside the crate.
pub trait OperatorPlugin: Send + Sync {
    /// The operator name. Must not clash with a built-in operator.
    fn name(&self) -> &str;

    /// The sort of each argument. The arity is the length.
    fn arg_sorts(&self) -> &[BaseSortKind];

    /// The sort every result belongs to.
    fn return_sort(&self) -> BaseSortKind;

    /// Applies the operator. `None` if it is undefined on the arguments.
    fn evaluate(&self, args: &[BigRational]) -> Option<BigRational>;
}

/// A plugin together with the operator id it was registered under.
pub struct RegisteredPlugin {
    id: PluginOpId,
    plugin: Box<dyn OperatorPlugin>,
}

impl RegisteredPlugin {
    /// The operator id.
    pub fn get_id(&self) -> PluginOpId {
        self.id
    }

    /// The operator name.
    pub fn get_name(&self) -> &str {
        self.plugin.name()
    }

    /// The number of arguments.
    pub fn arity(&self) -> usize {
        self.plugin.arg_sorts().len()
    }

    /// The wrapped plugin.
    pub fn get_plugin(&self) -> &dyn OperatorPlugin {
        self.plugin.as_ref()
    }

    fn apply(&self, args: &[BigRational]) -> Option<BigRational> {
        if args.len() != self.arity() {
            return None;
        }
        let res = self.plugin.evaluate(args)?;
        if self.plugin.return_sort().contains_rational(&res) {
            Some(res)
        } else {
            warn!(
                "plugin {} returned {} outside of its return sort {}",
                self.get_name(),
                res,
                self.plugin.return_sort().get_name()
            );
            None
        }
    }
}

impl Operator for RegisteredPlugin {
    fn get_name(&self) -> &str {
        self.plugin.name()
    }

    fn get_arity(&self) -> usize {
        self.arity()
    }

    fn validate(&self, app: &AppSyntax, program: &str, flags: &mut Vec<Flag>) -> bool {
        validate_shape(
            self.get_name(),
            self.arity(),
            |_| ArgShape::Forbidden,
            app,
            program,
            flags,
        )
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>, args: &[Bindable]) -> Option<Term> {
        let values = args
            .iter()
            .map(|a| match a {
                Bindable::Value(t) => t.as_rational().cloned(),
                Bindable::Comprehension(_) => None,
            })
            .collect::<Option<Vec<_>>>()?;
        if values.len() != self.arity() {
            return None;
        }
        let res = self.apply(&values)?;
        Some(ctx.index.mk_numeric(res))
    }

    fn approximate_up(&self, index: &TermIndex, args: &[Term]) -> Option<Vec<Term>> {
        if args.len() != self.arity() {
            return None;
        }
        let ground = args
            .iter()
            .map(|a| a.as_rational().cloned())
            .collect::<Option<Vec<_>>>();
        match ground {
            Some(values) => {
                let res = self.apply(&values)?;
                Some(vec![index.mk_numeric(res)])
            }
            None => Some(vec![index.mk_sort(self.plugin.return_sort())]),
        }
    }

    /// The declared argument sorts, if `expected` meets the return sort. Nothing else narrows them.
    fn approximate_down(
        &self,
        index: &TermIndex,
        expected: &Term,
        _args: &[Term],
    ) -> Option<Vec<Term>> {
        index.mk_intersection(expected, &index.mk_sort(self.plugin.return_sort()))?;
        Some(
            self.plugin
                .arg_sorts()
                .iter()
                .map(|s| index.mk_sort(*s))
                .collect(),
        )
    }
}

struct RegistryState {
    next_id: u32,
    plugins: Vec<Arc<RegisteredPlugin>>,
}

/// The process wide table of plugin operators. Plugins found by the loader are registered the first
/// time the table is read, at most once per registry.
pub struct PluginRegistry {
    loader: Option<Box<dyn PluginLoader>>,
    dirs: Vec<PathBuf>,
    state: Mutex<RegistryState>,
    loaded: OnceCell<()>,
}

impl PluginRegistry {
    /// A registry discovering plugins in `dirs` with `loader`.
    pub fn new(loader: Box<dyn PluginLoader>, dirs: Vec<PathBuf>) -> PluginRegistry {
        PluginRegistry {
            loader: Some(loader),
            dirs,
            state: Mutex::new(RegistryState {
                next_id: OpKind::ALL.len() as u32,
                plugins: Vec::new(),
            }),
            loaded: OnceCell::new(),
        }
    }

    /// A registry without discovery. Plugins may still be registered explicitly.
    pub fn empty() -> PluginRegistry {
        PluginRegistry {
            loader: None,
            dirs: Vec::new(),
            state: Mutex::new(RegistryState {
                next_id: OpKind::ALL.len() as u32,
                plugins: Vec::new(),
            }),
            loaded: OnceCell::new(),
        }
    }

    /// A registry reading manifests for the stock plugins from the configured plugin directories.
    pub fn from_env() -> PluginRegistry {
        PluginRegistry::new(
            Box::new(ManifestLoader::new(stock::catalog())),
            plugin_dirs_from_env(),
        )
    }

    /// The directories searched for plugins.
    pub fn get_dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Registers a plugin under a fresh operator id.
    pub fn register(&self, plugin: Box<dyn OperatorPlugin>) -> Result<Arc<RegisteredPlugin>> {
        let name = plugin.name().to_owned();
        if name.is_empty() {
            return Err(anyhow!("plugin without a name"));
        }
        if OpKind::ALL.iter().any(|k| k.get_name() == name) {
            return Err(anyhow!("plugin {} shadows a built-in operator", name));
        }

        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("plugin registry poisoned"))?;
        if state.plugins.iter().any(|p| p.get_name() == name) {
            return Err(anyhow!("plugin {} is already registered", name));
        }
        let registered = Arc::new(RegisteredPlugin {
            id: PluginOpId(state.next_id),
            plugin,
        });
        state.next_id += 1;
        state.plugins.push(registered.clone());
        info!(
            "registered plugin {} with arity {} as operator {}",
            name,
            registered.arity(),
            registered.id.0
        );
        Ok(registered)
    }

    fn ensure_loaded(&self) {
        self.loaded.get_or_init(|| {
            if let Some(loader) = self.loader.as_ref() {
                self.load_from(loader.as_ref());
            }
        });
    }

    fn load_from(&self, loader: &dyn PluginLoader) {
        for dir in self.dirs.iter() {
            let candidates = match loader.candidates(dir) {
                Ok(c) => c,
                Err(e) => {
                    warn!("skipping plugin directory {}: {:#}", dir.display(), e);
                    continue;
                }
            };
            for candidate in candidates.iter() {
                let plugins = match loader.load(candidate) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("skipping plugin module {}: {:#}", candidate.display(), e);
                        continue;
                    }
                };
                for plugin in plugins.into_iter() {
                    if let Err(e) = self.register(plugin) {
                        warn!("skipping plugin from {}: {:#}", candidate.display(), e);
                    }
                }
            }
        }
    }

    /// Every registered plugin, loading them first if that has not happened yet.
    pub fn get_plugins(&self) -> Vec<Arc<RegisteredPlugin>> {
        self.ensure_loaded();
        match self.state.lock() {
            Ok(state) => state.plugins.clone(),
            Err(poisoned) => poisoned.into_inner().plugins.clone(),
        }
    }

    /// The plugin with an operator id.
    pub fn get(&self, id: PluginOpId) -> Option<Arc<RegisteredPlugin>> {
        self.get_plugins().into_iter().find(|p| p.get_id() == id)
    }

    /// The plugin with a name.
    pub fn find(&self, name: &str) -> Option<Arc<RegisteredPlugin>> {
        self.get_plugins().into_iter().find(|p| p.get_name() == name)
    }
}

/// The plugin directories named by [PLUGIN_DIRS_VAR], or [DEFAULT_PLUGIN_DIR] next to the executable.
pub fn plugin_dirs_from_env() -> Vec<PathBuf> {
    match env::var(PLUGIN_DIRS_VAR) {
        Ok(dirs) => parse_plugin_dirs(&dirs),
        Err(_) => env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join(DEFAULT_PLUGIN_DIR)))
            .into_iter()
            .collect(),
    }
}

/// Splits a `;` separated directory list, dropping empty entries.
pub fn parse_plugin_dirs(dirs: &str) -> Vec<PathBuf> {
    dirs.split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .collect()
}
