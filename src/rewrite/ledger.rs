//! Per-file accumulator filled during the walk and drained by finalize.

use crate::edit::Edit;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;

/// One name required in the consolidated vitest import.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSymbol {
    pub name: String,
    pub alias: Option<String>,
    pub type_only: bool,
}

impl ImportSymbol {
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            type_only: false,
        }
    }

    pub fn type_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            type_only: true,
        }
    }

    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }
}

impl fmt::Display for ImportSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.type_only {
            write!(f, "type ")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

/// A function that must become `async`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncPatch {
    /// Where `async ` is inserted.
    pub fn_start: usize,
    /// Span of the annotated return type, without the leading colon.
    pub return_type: Option<Range<usize>>,
}

/// Whether a CommonJS location global is declared in the file or merely used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShimFlag {
    #[default]
    Unseen,
    Needed,
    Declared,
}

impl ShimFlag {
    fn reference(&mut self) {
        if *self == ShimFlag::Unseen {
            *self = ShimFlag::Needed;
        }
    }

    fn declare(&mut self) {
        *self = ShimFlag::Declared;
    }

    pub fn is_needed(self) -> bool {
        self == ShimFlag::Needed
    }

    pub fn is_declared(self) -> bool {
        self == ShimFlag::Declared
    }
}

/// The two CommonJS globals replaced by the ESM shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationGlobal {
    Dirname,
    Filename,
}

impl LocationGlobal {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "__dirname" => Some(LocationGlobal::Dirname),
            "__filename" => Some(LocationGlobal::Filename),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvShimState {
    pub dirname: ShimFlag,
    pub filename: ShimFlag,
}

impl EnvShimState {
    fn flag_mut(&mut self, global: LocationGlobal) -> &mut ShimFlag {
        match global {
            LocationGlobal::Dirname => &mut self.dirname,
            LocationGlobal::Filename => &mut self.filename,
        }
    }

    /// Shim output is required when either global is used undeclared.
    pub fn is_needed(&self) -> bool {
        self.dirname.is_needed() || self.filename.is_needed()
    }
}

#[derive(Debug, Default)]
pub struct EditLedger {
    edits: Vec<Edit>,
    imports: HashMap<(String, Option<String>), ImportSymbol>,
    async_patches: BTreeMap<usize, AsyncPatch>,
    shims: EnvShimState,
    url_import: Option<Range<usize>>,
    has_path_import: bool,
}

impl EditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Record a required import. A symbol needed both as a value and as a
    /// type is kept as a value.
    pub fn require(&mut self, symbol: ImportSymbol) {
        let key = (symbol.name.clone(), symbol.alias.clone());
        self.imports
            .entry(key)
            .and_modify(|existing| existing.type_only &= symbol.type_only)
            .or_insert(symbol);
    }

    pub fn require_value(&mut self, name: &str) {
        self.require(ImportSymbol::value(name));
    }

    pub fn require_type(&mut self, name: &str) {
        self.require(ImportSymbol::type_only(name));
    }

    /// Flag a function for an async patch. Repeated requests are merged.
    pub fn require_async(&mut self, patch: AsyncPatch) {
        self.async_patches.entry(patch.fn_start).or_insert(patch);
    }

    pub fn reference_global(&mut self, global: LocationGlobal) {
        self.shims.flag_mut(global).reference();
    }

    pub fn declare_global(&mut self, global: LocationGlobal) {
        self.shims.flag_mut(global).declare();
    }

    pub fn record_url_import(&mut self, span: Range<usize>) {
        self.url_import.get_or_insert(span);
    }

    pub fn record_path_import(&mut self) {
        self.has_path_import = true;
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn shims(&self) -> EnvShimState {
        self.shims
    }

    pub fn url_import(&self) -> Option<Range<usize>> {
        self.url_import.clone()
    }

    pub fn has_path_import(&self) -> bool {
        self.has_path_import
    }

    pub fn async_patches(&self) -> impl Iterator<Item = &AsyncPatch> {
        self.async_patches.values()
    }

    /// Required symbols in emission order: case-insensitive by bare name,
    /// values before types, then exact spelling.
    pub fn sorted_imports(&self) -> Vec<ImportSymbol> {
        let mut symbols: Vec<ImportSymbol> = self.imports.values().cloned().collect();
        symbols.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.type_only.cmp(&b.type_only))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.alias.cmp(&b.alias))
        });
        symbols
    }

    /// Nothing was observed that would change the file.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
            && self.imports.is_empty()
            && self.async_patches.is_empty()
            && !self.shims.is_needed()
    }

    pub fn into_edits(self) -> Vec<Edit> {
        self.edits
    }
}
