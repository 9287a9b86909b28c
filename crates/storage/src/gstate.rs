//! Columnar table store.
//!
//! `GState` owns the row data of one table. Each call to [`GState::process`]
//! is one processing pass: it opens a cycle on every subscribed context,
//! flattens and applies the batch, notifies the contexts and closes the cycle.

use crate::mutation::{flatten, Mutation};
use crate::registry::{ContextId, ContextRegistry};
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use tessel_context::{Context, TableStore, UnitContext};
use tessel_core::{
    DataTable, DataType, Error, Result, Scalar, Schema, StepBatch, Symbol, SymbolTable, Value,
    ValueTransition,
};
use tracing::{debug, error};

/// Primary key index: symbol -> row position.
#[cfg(not(feature = "btree-index"))]
type PkeyMap = hashbrown::HashMap<Symbol, usize>;
#[cfg(feature = "btree-index")]
type PkeyMap = alloc::collections::BTreeMap<Symbol, usize>;

/// In-memory columnar table keyed by primary key.
pub struct GState {
    schema: Schema,
    pkey_type: DataType,
    pkeys: Vec<Scalar>,
    columns: Vec<Vec<Scalar>>,
    index: PkeyMap,
    symbols: Rc<SymbolTable>,
    registry: ContextRegistry,
    populated: bool,
}

impl GState {
    /// Creates an empty store for `schema`, keyed by values of `pkey_type`.
    pub fn new(schema: Schema, pkey_type: DataType) -> Self {
        let columns = (0..schema.len()).map(|_| Vec::new()).collect();
        Self {
            schema,
            pkey_type,
            pkeys: Vec::new(),
            columns,
            index: PkeyMap::default(),
            symbols: Rc::new(SymbolTable::new()),
            registry: ContextRegistry::new(),
            populated: false,
        }
    }

    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the symbol table shared by this store and its contexts.
    #[inline]
    pub fn symbols(&self) -> Rc<SymbolTable> {
        self.symbols.clone()
    }

    /// Returns true once the first-load batch has been delivered.
    #[inline]
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Subscribes a context to future batches.
    pub fn subscribe(&mut self, ctx: Rc<RefCell<dyn Context>>) -> ContextId {
        self.registry.register(ctx)
    }

    pub fn unsubscribe(&mut self, id: ContextId) -> bool {
        self.registry.unregister(id)
    }

    /// Returns the number of live subscribed contexts.
    pub fn num_contexts(&self) -> usize {
        self.registry.len()
    }

    /// Creates an initialized unit context over this store and subscribes it.
    pub fn make_unit_context(&mut self) -> Rc<RefCell<UnitContext>> {
        let mut ctx = UnitContext::new(self.schema.clone(), self.symbols());
        ctx.init();
        let ctx = Rc::new(RefCell::new(ctx));
        self.subscribe(ctx.clone());
        ctx
    }

    /// Returns the position of the row with primary key `pkey`.
    pub fn row_position(&self, pkey: &Scalar) -> Option<usize> {
        self.symbols
            .lookup(pkey)
            .and_then(|sym| self.index.get(&sym).copied())
    }

    /// Returns a copy of the row with primary key `pkey`.
    pub fn get_row(&self, pkey: &Scalar) -> Option<Vec<Scalar>> {
        self.row_position(pkey)
            .map(|pos| self.columns.iter().map(|c| c[pos].clone()).collect())
    }

    /// Applies a batch of mutations and notifies every subscribed context.
    ///
    /// The batch is validated before anything changes. The first batch that
    /// leaves the store non-empty is delivered with `notify_initial`; every
    /// batch after it with `notify`. A context error does not stop the other
    /// contexts from being notified; the first error is returned.
    pub fn process(&mut self, mutations: Vec<Mutation>) -> Result<()> {
        self.validate(&mutations)?;
        let mutations = flatten(mutations);
        let batch = self.build_step_batch(&mutations)?;

        self.cleanup_contexts();
        let opened = self.registry.for_each(|_, ctx| {
            ctx.step_begin();
            Ok(())
        });

        self.apply(mutations);

        let notified = if self.populated {
            self.registry.for_each(|id, ctx| {
                ctx.notify(&batch).map_err(|err| {
                    error!(context = id, error = %err, "context rejected batch");
                    err
                })
            })
        } else if !self.pkeys.is_empty() {
            self.populated = true;
            self.registry.for_each(|id, ctx| {
                ctx.notify_initial(&batch.flattened).map_err(|err| {
                    error!(context = id, error = %err, "context rejected first load");
                    err
                })
            })
        } else {
            Ok(())
        };

        let closed = self.registry.for_each(|_, ctx| {
            ctx.step_end();
            Ok(())
        });

        debug!(
            rows = batch.flattened.size(),
            num_rows = self.pkeys.len(),
            contexts = self.registry.len(),
            "processed batch"
        );

        opened.and(notified).and(closed)
    }

    fn cleanup_contexts(&mut self) {
        self.registry.cleanup();
    }

    fn validate(&self, mutations: &[Mutation]) -> Result<()> {
        for mutation in mutations {
            let pkey = mutation.pkey();
            if !pkey.is_valid() || pkey.is_none() {
                return Err(Error::invalid_operation("primary key must be a valid value"));
            }
            if pkey.data_type() != self.pkey_type {
                return Err(Error::invalid_operation(format!(
                    "primary key {} is not of type {}",
                    pkey,
                    self.pkey_type.name()
                )));
            }
            if let Mutation::Upsert { values, .. } = mutation {
                if values.len() != self.schema.len() {
                    return Err(Error::invalid_operation(format!(
                        "row for key {} has {} values, table has {} columns",
                        pkey,
                        values.len(),
                        self.schema.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Describes a flattened batch against the current (pre-batch) state.
    fn build_step_batch(&self, mutations: &[Mutation]) -> Result<StepBatch> {
        let mut flattened = DataTable::flattened(self.pkey_type, &self.schema)?;
        let mut delta = DataTable::new(self.schema.clone());
        let mut prev = DataTable::new(self.schema.clone());
        let mut curr = DataTable::new(self.schema.clone());
        let transition_schema = Schema::new(
            self.schema
                .columns()
                .iter()
                .map(|name| (name.clone(), DataType::UInt8)),
        )?;
        let mut transitions = DataTable::new(transition_schema);
        let mut existed = DataTable::new(Schema::new([("psp_existed", DataType::Bool)])?);

        let types = self.schema.types();

        for mutation in mutations {
            let pos = self.row_position(mutation.pkey());
            let prev_row: Vec<Scalar> = match pos {
                Some(pos) => self.columns.iter().map(|c| c[pos].clone()).collect(),
                None => types.iter().map(|&dt| Scalar::invalid(dt)).collect(),
            };
            let (curr_row, deleted) = match mutation {
                Mutation::Upsert { values, .. } => (values.clone(), false),
                Mutation::Delete { .. } => {
                    (types.iter().map(|&dt| Scalar::invalid(dt)).collect(), true)
                }
            };

            let delta_row = prev_row
                .iter()
                .zip(&curr_row)
                .zip(types)
                .map(|((p, c), &dt)| numeric_delta(p, c, dt))
                .collect();
            let transition_row = prev_row
                .iter()
                .zip(&curr_row)
                .map(|(p, c)| {
                    let code = ValueTransition::classify(p.is_valid(), c.is_valid(), p == c, deleted);
                    Scalar::from(code.code())
                })
                .collect();

            flattened.push_flattened(mutation.pkey().clone(), mutation.op(), curr_row.clone())?;
            delta.push_row(delta_row)?;
            prev.push_row(prev_row)?;
            curr.push_row(curr_row)?;
            transitions.push_row(transition_row)?;
            existed.push_row(alloc::vec![Scalar::from(pos.is_some())])?;
        }

        Ok(StepBatch {
            flattened,
            delta,
            prev,
            curr,
            transitions,
            existed,
        })
    }

    /// Writes a validated, flattened batch into the columns.
    fn apply(&mut self, mutations: Vec<Mutation>) {
        let mut removed: Vec<usize> = Vec::new();

        for mutation in mutations {
            match mutation {
                Mutation::Upsert { pkey, values } => match self.row_position(&pkey) {
                    Some(pos) => {
                        for (column, value) in self.columns.iter_mut().zip(values) {
                            column[pos] = value;
                        }
                    }
                    None => {
                        let sym = self.symbols.intern(&pkey);
                        self.index.insert(sym, self.pkeys.len());
                        self.pkeys.push(pkey);
                        for (column, value) in self.columns.iter_mut().zip(values) {
                            column.push(value);
                        }
                    }
                },
                Mutation::Delete { pkey } => {
                    if let Some(pos) = self.row_position(&pkey) {
                        removed.push(pos);
                    }
                }
            }
        }

        if !removed.is_empty() {
            self.compact(&removed);
        }
    }

    /// Drops the rows at `removed` and rebuilds the key index.
    fn compact(&mut self, removed: &[usize]) {
        let mut keep = alloc::vec![true; self.pkeys.len()];
        for &pos in removed {
            keep[pos] = false;
        }

        let mut flags = keep.iter();
        self.pkeys.retain(|_| *flags.next().unwrap_or(&true));
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.retain(|_| *flags.next().unwrap_or(&true));
        }

        self.index.clear();
        for (pos, pkey) in self.pkeys.iter().enumerate() {
            let sym = self.symbols.intern(pkey);
            self.index.insert(sym, pos);
        }
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .get_column_index(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    fn read_cell(&self, col: usize, row: Option<usize>) -> Scalar {
        row.and_then(|r| self.columns[col].get(r))
            .cloned()
            .unwrap_or_else(|| Scalar::invalid(self.schema.types()[col]))
    }
}

/// Difference between two numeric cells, or an invalid scalar when either
/// side is missing or the type is not numeric.
fn numeric_delta(prev: &Scalar, curr: &Scalar, dt: DataType) -> Scalar {
    let prev_value = if prev.is_valid() {
        prev.value().clone()
    } else {
        Value::default_for_type(dt)
    };
    let curr_value = if curr.is_valid() {
        curr.value().clone()
    } else {
        Value::default_for_type(dt)
    };
    match (prev_value, curr_value) {
        (Value::Int32(p), Value::Int32(c)) => Scalar::from(c.wrapping_sub(p)),
        (Value::Int64(p), Value::Int64(c)) => Scalar::from(c.wrapping_sub(p)),
        (Value::Float64(p), Value::Float64(c)) => Scalar::from(c - p),
        _ => Scalar::invalid(dt),
    }
}

impl TableStore for GState {
    fn num_rows(&self) -> usize {
        self.pkeys.len()
    }

    fn num_columns(&self) -> usize {
        self.schema.len()
    }

    fn read_column(&self, name: &str, start: usize, end: usize, out: &mut Vec<Scalar>) -> Result<()> {
        let col = self.column_index(name)?;
        out.clear();
        out.extend((start..end).map(|r| self.read_cell(col, Some(r))));
        Ok(())
    }

    fn read_column_by_indices(&self, name: &str, rows: &[usize], out: &mut Vec<Scalar>) -> Result<()> {
        let col = self.column_index(name)?;
        out.clear();
        out.extend(rows.iter().map(|&r| self.read_cell(col, Some(r))));
        Ok(())
    }

    fn read_column_by_pkeys(&self, name: &str, pkeys: &[Scalar], out: &mut Vec<Scalar>) -> Result<()> {
        let col = self.column_index(name)?;
        out.clear();
        out.extend(pkeys.iter().map(|k| self.read_cell(col, self.row_position(k))));
        Ok(())
    }
}
