//! The identity view.
//!
//! `UnitContext` exposes the store's rows as they are: no filters, sorts,
//! groupings or aggregates are applied. It tracks the primary key of every
//! row a batch touches until the next `step_begin`.

use crate::context::Context;
use crate::row_delta::RowDelta;
use crate::store::TableStore;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use hashbrown::HashSet;
use tessel_core::{
    DataTable, DataType, Error, Extent, Op, Result, Scalar, Schema, StepBatch, Symbol,
    SymbolTable, OP_COLUMN, PKEY_COLUMN,
};
use tracing::{debug, warn};

/// Identity view over a table store.
pub struct UnitContext {
    schema: Schema,
    symbols: Rc<SymbolTable>,
    init: bool,
    has_delta: bool,
    // Never set by the identity view.
    rows_changed: bool,
    columns_changed: bool,
    delta_pkeys: HashSet<Symbol>,
}

impl UnitContext {
    /// Creates an uninitialized context bound to `schema`.
    ///
    /// `symbols` must be the symbol table shared by every context of the
    /// same store.
    pub fn new(schema: Schema, symbols: Rc<SymbolTable>) -> Self {
        Self {
            schema,
            symbols,
            init: false,
            has_delta: false,
            rows_changed: false,
            columns_changed: false,
            delta_pkeys: HashSet::new(),
        }
    }

    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[inline]
    pub fn symbols(&self) -> &Rc<SymbolTable> {
        &self.symbols
    }

    /// Marks an interned primary key as changed.
    #[inline]
    pub fn add_delta_pkey(&mut self, pkey: Symbol) {
        self.delta_pkeys.insert(pkey);
    }

    /// Returns the primary keys changed since the last `step_begin`.
    #[inline]
    pub fn get_delta_pkeys(&self) -> &HashSet<Symbol> {
        &self.delta_pkeys
    }

    #[inline]
    pub fn rows_changed(&self) -> bool {
        self.rows_changed
    }

    #[inline]
    pub fn columns_changed(&self) -> bool {
        self.columns_changed
    }

    fn pkey_column(flattened: &DataTable) -> Result<&[Scalar]> {
        flattened
            .get_column(PKEY_COLUMN)
            .ok_or_else(|| Error::protocol_violation("batch has no psp_pkey column"))
    }

    fn decode_ops(flattened: &DataTable) -> Result<Vec<Op>> {
        let column = flattened
            .get_column(OP_COLUMN)
            .ok_or_else(|| Error::protocol_violation("batch has no psp_op column"))?;
        column
            .iter()
            .map(|cell| {
                let code = cell.as_u8().ok_or_else(|| {
                    Error::protocol_violation(format!("op cell {} is not a uint8", cell))
                })?;
                Op::try_from(code)
            })
            .collect()
    }

    /// Reads whole rows through `read`, one column at a time, into a
    /// row-major buffer of `num_rows` rows.
    fn read_rows<F>(&self, store: &dyn TableStore, num_rows: usize, mut read: F) -> Result<Vec<Scalar>>
    where
        F: FnMut(&str, &mut Vec<Scalar>) -> Result<()>,
    {
        let stride = self.get_column_count(store);
        let mut values = vec![Scalar::none(); num_rows * stride];
        if values.is_empty() {
            return Ok(values);
        }

        let columns = self.schema.columns();
        let mut out = Vec::with_capacity(num_rows);

        for cidx in 0..stride {
            let Some(name) = columns.get(cidx) else {
                continue;
            };
            read(name, &mut out)?;
            for (ridx, v) in out.drain(..).take(num_rows).enumerate() {
                values[ridx * stride + cidx] = v.or_none();
            }
        }

        Ok(values)
    }
}

impl Context for UnitContext {
    fn init(&mut self) {
        self.init = true;
    }

    fn is_initialized(&self) -> bool {
        self.init
    }

    fn step_begin(&mut self) {
        if !self.init {
            return;
        }

        self.delta_pkeys.clear();
        self.rows_changed = false;
        self.columns_changed = false;
    }

    fn step_end(&mut self) {}

    fn notify_initial(&mut self, flattened: &DataTable) -> Result<()> {
        let pkeys = Self::pkey_column(flattened)?;

        self.has_delta = true;

        for pkey in pkeys {
            let sym = self.symbols.intern(pkey);
            self.add_delta_pkey(sym);
        }

        debug!(rows = flattened.size(), tracked = self.delta_pkeys.len(), "unit context first load");
        Ok(())
    }

    fn notify(&mut self, batch: &StepBatch) -> Result<()> {
        let flattened = &batch.flattened;

        // Decode the whole batch first so a bad code leaves the view untouched.
        let decoded = Self::pkey_column(flattened)
            .and_then(|pkeys| Self::decode_ops(flattened).map(|ops| (pkeys, ops)));
        let (pkeys, ops) = match decoded {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(error = %err, rows = flattened.size(), "unit context rejected batch");
                return Err(err);
            }
        };

        let mut delete_encountered = false;

        for (pkey, op) in pkeys.iter().zip(ops) {
            match op {
                Op::Insert => {}
                Op::Delete => delete_encountered = true,
            }

            // Inserts and deletes both count as changed rows.
            let sym = self.symbols.intern(pkey);
            self.add_delta_pkey(sym);
        }

        self.has_delta = !self.delta_pkeys.is_empty() || delete_encountered;

        debug!(
            rows = flattened.size(),
            delete_encountered,
            tracked = self.delta_pkeys.len(),
            "unit context notified"
        );
        Ok(())
    }

    fn get_row_count(&self, store: &dyn TableStore) -> usize {
        store.num_rows()
    }

    fn get_column_count(&self, store: &dyn TableStore) -> usize {
        store.num_columns()
    }

    fn get_data(
        &self,
        store: &dyn TableStore,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
    ) -> Result<Vec<Scalar>> {
        let ext = Extent::sanitize(
            self.get_row_count(store),
            self.get_column_count(store),
            start_row,
            end_row,
            start_col,
            end_col,
        );

        let num_rows = ext.num_rows();
        let stride = ext.num_columns();
        let mut values = vec![Scalar::none(); num_rows * stride];
        if values.is_empty() {
            return Ok(values);
        }

        let columns = self.schema.columns();
        let mut out = Vec::with_capacity(num_rows);

        for cidx in ext.cols() {
            let Some(name) = columns.get(cidx) else {
                continue;
            };
            store.read_column(name, ext.start_row, ext.end_row, &mut out)?;
            for (ridx, v) in out.drain(..).take(num_rows).enumerate() {
                values[ridx * stride + (cidx - ext.start_col)] = v.or_none();
            }
        }

        Ok(values)
    }

    fn get_data_by_indices(&self, store: &dyn TableStore, rows: &[usize]) -> Result<Vec<Scalar>> {
        self.read_rows(store, rows.len(), |name, out| {
            store.read_column_by_indices(name, rows, out)
        })
    }

    fn get_data_by_pkeys(&self, store: &dyn TableStore, pkeys: &[Scalar]) -> Result<Vec<Scalar>> {
        self.read_rows(store, pkeys.len(), |name, out| {
            store.read_column_by_pkeys(name, pkeys, out)
        })
    }

    fn get_pkeys(&self, _cells: &[(usize, usize)]) -> Result<Vec<Scalar>> {
        Err(Error::unimplemented("UnitContext::get_pkeys"))
    }

    fn get_column_name(&self, idx: usize) -> String {
        self.schema
            .columns()
            .get(idx)
            .cloned()
            .unwrap_or_default()
    }

    fn get_column_names(&self) -> Vec<String> {
        self.schema.columns().to_vec()
    }

    fn get_column_dtype(&self, store: &dyn TableStore, idx: usize) -> DataType {
        if idx >= self.get_column_count(store) {
            return DataType::None;
        }

        let name = self.get_column_name(idx);
        if !self.schema.has_column(&name) {
            return DataType::None;
        }

        self.schema.get_dtype(&name)
    }

    fn get_row_delta(&mut self, store: &dyn TableStore) -> Result<RowDelta> {
        let structural_change = self.has_delta;

        let pkeys: Vec<Scalar> = self
            .delta_pkeys
            .iter()
            .filter_map(|&sym| self.symbols.resolve(sym))
            .collect();

        let rows = self.get_data_by_pkeys(store, &pkeys)?;
        let delta = RowDelta::new(structural_change, pkeys, rows);

        // The tracking set survives a harvest; only step_begin clears it.
        self.clear_deltas();

        debug!(rows = delta.count, structural_change, "unit context harvested row delta");
        Ok(delta)
    }

    fn has_deltas(&self) -> bool {
        self.has_delta
    }

    fn get_deltas_enabled(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.has_delta = false;
    }

    fn clear_deltas(&mut self) {
        self.has_delta = false;
    }

    fn sidedness(&self) -> usize {
        0
    }

    fn repr(&self) -> String {
        format!("UnitContext<{:p}>", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use hashbrown::HashMap;

    /// Row-oriented store keyed by the first column.
    struct MockStore {
        columns: Vec<String>,
        rows: Vec<Vec<Scalar>>,
    }

    impl MockStore {
        fn new(rows: Vec<Vec<Scalar>>) -> Self {
            Self {
                columns: vec!["a".to_string(), "b".to_string()],
                rows,
            }
        }

        fn col(&self, name: &str) -> Result<usize> {
            self.columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| Error::column_not_found(name))
        }

        fn cell(&self, row: usize, col: usize, dt: DataType) -> Scalar {
            self.rows
                .get(row)
                .and_then(|r| r.get(col))
                .cloned()
                .unwrap_or_else(|| Scalar::invalid(dt))
        }
    }

    impl TableStore for MockStore {
        fn num_rows(&self) -> usize {
            self.rows.len()
        }

        fn num_columns(&self) -> usize {
            self.columns.len()
        }

        fn read_column(&self, name: &str, start: usize, end: usize, out: &mut Vec<Scalar>) -> Result<()> {
            let col = self.col(name)?;
            out.clear();
            out.extend((start..end).map(|r| self.cell(r, col, DataType::Int64)));
            Ok(())
        }

        fn read_column_by_indices(&self, name: &str, rows: &[usize], out: &mut Vec<Scalar>) -> Result<()> {
            let col = self.col(name)?;
            out.clear();
            out.extend(rows.iter().map(|&r| self.cell(r, col, DataType::Int64)));
            Ok(())
        }

        fn read_column_by_pkeys(&self, name: &str, pkeys: &[Scalar], out: &mut Vec<Scalar>) -> Result<()> {
            let col = self.col(name)?;
            let index: HashMap<&Scalar, usize> =
                self.rows.iter().enumerate().map(|(i, r)| (&r[0], i)).collect();
            out.clear();
            out.extend(pkeys.iter().map(|k| match index.get(k) {
                Some(&r) => self.cell(r, col, DataType::Int64),
                None => Scalar::invalid(DataType::Int64),
            }));
            Ok(())
        }
    }

    fn schema() -> Schema {
        Schema::new(vec![("a", DataType::Int64), ("b", DataType::Str)]).unwrap()
    }

    fn row(a: i64, b: &str) -> Vec<Scalar> {
        vec![Scalar::from(a), Scalar::from(b)]
    }

    fn store() -> MockStore {
        MockStore::new(vec![row(1, "x"), row(2, "y"), row(3, "z")])
    }

    fn batch(entries: &[(i64, u8)]) -> DataTable {
        let mut table = DataTable::flattened(DataType::Int64, &schema()).unwrap();
        for &(key, op) in entries {
            table
                .push_row(vec![
                    Scalar::from(key),
                    Scalar::from(op),
                    Scalar::from(key),
                    Scalar::from("v"),
                ])
                .unwrap();
        }
        table
    }

    fn context() -> UnitContext {
        let mut ctx = UnitContext::new(schema(), Rc::new(SymbolTable::new()));
        ctx.init();
        ctx
    }

    fn tracked(ctx: &UnitContext) -> Vec<i64> {
        let mut keys: Vec<i64> = ctx
            .get_delta_pkeys()
            .iter()
            .filter_map(|&s| ctx.symbols().resolve(s))
            .filter_map(|k| k.as_i64())
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut ctx = UnitContext::new(schema(), Rc::new(SymbolTable::new()));
        assert!(!ctx.is_initialized());
        ctx.init();
        ctx.init();
        assert!(ctx.is_initialized());
    }

    #[test]
    fn test_notify_initial_tracks_every_row() {
        let mut ctx = context();
        ctx.notify_initial(&batch(&[(1, 0), (2, 0), (3, 0)])).unwrap();
        assert!(ctx.has_deltas());
        assert_eq!(tracked(&ctx), vec![1, 2, 3]);
    }

    #[test]
    fn test_notify_initial_empty_batch_still_flags() {
        let mut ctx = context();
        ctx.notify_initial(&batch(&[])).unwrap();
        assert!(ctx.has_deltas());
        assert!(ctx.get_delta_pkeys().is_empty());
    }

    #[test]
    fn test_notify_dedupes_keys() {
        let mut ctx = context();
        ctx.notify(&StepBatch::new(batch(&[(1, 0), (1, 0), (2, 1)]))).unwrap();
        assert_eq!(tracked(&ctx), vec![1, 2]);
    }

    #[test]
    fn test_notify_delete_only_sets_deltas() {
        let mut ctx = context();
        ctx.notify(&StepBatch::new(batch(&[(7, 1)]))).unwrap();
        assert!(ctx.has_deltas());
        assert_eq!(tracked(&ctx), vec![7]);
    }

    #[test]
    fn test_notify_empty_batch_clears_flag_when_nothing_tracked() {
        let mut ctx = context();
        ctx.notify(&StepBatch::new(batch(&[]))).unwrap();
        assert!(!ctx.has_deltas());
    }

    #[test]
    fn test_notify_does_not_clear_tracking_set() {
        let mut ctx = context();
        ctx.notify(&StepBatch::new(batch(&[(1, 0)]))).unwrap();
        ctx.notify(&StepBatch::new(batch(&[(2, 0)]))).unwrap();
        assert_eq!(tracked(&ctx), vec![1, 2]);
    }

    #[test]
    fn test_notify_rejects_unknown_op() {
        let mut ctx = context();
        let err = ctx
            .notify(&StepBatch::new(batch(&[(1, 0), (2, 9)])))
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, Error::ProtocolViolation { .. }));
        assert!(ctx.get_delta_pkeys().is_empty());
        assert!(!ctx.has_deltas());
    }

    #[test]
    fn test_notify_rejects_batch_without_op_column() {
        let mut ctx = context();
        let flattened = DataTable::new(
            Schema::new(vec![(PKEY_COLUMN, DataType::Int64)]).unwrap(),
        );
        let err = ctx.notify(&StepBatch::new(flattened)).unwrap_err();
        assert!(matches!(err, Error::ProtocolViolation { .. }));
    }

    #[test]
    fn test_notify_ignores_auxiliary_tables() {
        let mut plain = context();
        let mut full = context();
        let flattened = batch(&[(1, 0), (2, 1)]);
        let aux = DataTable::new(schema());
        let step = StepBatch {
            flattened: flattened.clone(),
            delta: aux.clone(),
            prev: aux.clone(),
            curr: aux.clone(),
            transitions: aux.clone(),
            existed: aux,
        };
        plain.notify(&StepBatch::new(flattened)).unwrap();
        full.notify(&step).unwrap();
        assert_eq!(tracked(&plain), tracked(&full));
        assert_eq!(plain.has_deltas(), full.has_deltas());
    }

    #[test]
    fn test_step_begin_clears_after_init() {
        let mut ctx = context();
        ctx.notify(&StepBatch::new(batch(&[(1, 0)]))).unwrap();
        ctx.step_begin();
        assert!(ctx.get_delta_pkeys().is_empty());
        assert!(!ctx.rows_changed());
        assert!(!ctx.columns_changed());
    }

    #[test]
    fn test_step_begin_before_init_is_noop() {
        let mut ctx = UnitContext::new(schema(), Rc::new(SymbolTable::new()));
        ctx.notify(&StepBatch::new(batch(&[(1, 0)]))).unwrap();
        ctx.step_begin();
        assert_eq!(ctx.get_delta_pkeys().len(), 1);
    }

    #[test]
    fn test_shared_symbols_are_canonical_across_contexts() {
        let symbols = Rc::new(SymbolTable::new());
        let mut a = UnitContext::new(schema(), symbols.clone());
        let mut b = UnitContext::new(schema(), symbols);
        a.notify(&StepBatch::new(batch(&[(5, 0)]))).unwrap();
        b.notify(&StepBatch::new(batch(&[(5, 1)]))).unwrap();
        assert_eq!(a.get_delta_pkeys(), b.get_delta_pkeys());
    }

    #[test]
    fn test_get_row_delta_is_repeatable() {
        let store = store();
        let mut ctx = context();
        ctx.notify_initial(&batch(&[(1, 0), (2, 0), (3, 0)])).unwrap();

        let first = ctx.get_row_delta(&store).unwrap();
        assert!(first.structural_change);
        assert_eq!(first.count, 3);
        assert_eq!(first.row_for(&Scalar::from(2i64)), Some(&row(2, "y")[..]));
        assert!(!ctx.has_deltas());

        let second = ctx.get_row_delta(&store).unwrap();
        assert!(!second.structural_change);
        assert_eq!(first.pkeys, second.pkeys);
        assert_eq!(first.rows, second.rows);
        assert_eq!(tracked(&ctx), vec![1, 2, 3]);
    }

    #[test]
    fn test_get_row_delta_missing_key_reads_none() {
        let store = store();
        let mut ctx = context();
        ctx.notify(&StepBatch::new(batch(&[(9, 1)]))).unwrap();
        let delta = ctx.get_row_delta(&store).unwrap();
        assert_eq!(delta.count, 1);
        assert_eq!(delta.rows, vec![Scalar::none(), Scalar::none()]);
    }

    #[test]
    fn test_get_data_range() {
        let store = store();
        let ctx = context();
        let data = ctx.get_data(&store, 1, 3, 0, 2).unwrap();
        assert_eq!(data, [row(2, "y"), row(3, "z")].concat());
    }

    #[test]
    fn test_get_data_range_clips_columns() {
        let store = store();
        let ctx = context();
        let data = ctx.get_data(&store, 0, 2, 1, 10).unwrap();
        assert_eq!(data, vec![Scalar::from("x"), Scalar::from("y")]);
    }

    #[test]
    fn test_get_data_range_clips_rows() {
        let store = store();
        let ctx = context();
        let data = ctx.get_data(&store, 2, 100, 0, 2).unwrap();
        assert_eq!(data, row(3, "z"));
    }

    #[test]
    fn test_get_data_inverted_range_is_empty() {
        let store = store();
        let ctx = context();
        assert!(ctx.get_data(&store, 2, 1, 0, 2).unwrap().is_empty());
        assert!(ctx.get_data(&store, 1, 1, 0, 2).unwrap().is_empty());
    }

    #[test]
    fn test_get_data_substitutes_none_for_invalid() {
        let store = MockStore::new(vec![
            vec![Scalar::from(1i64), Scalar::invalid(DataType::Str)],
        ]);
        let ctx = context();
        let data = ctx.get_data(&store, 0, 1, 0, 2).unwrap();
        assert_eq!(data, vec![Scalar::from(1i64), Scalar::none()]);
        assert!(data.iter().all(|v| v.is_valid()));
    }

    #[test]
    fn test_get_data_by_indices_preserves_order() {
        let store = store();
        let ctx = context();
        let data = ctx.get_data_by_indices(&store, &[2, 0, 2, 10]).unwrap();
        assert_eq!(
            data,
            [row(3, "z"), row(1, "x"), row(3, "z"), vec![Scalar::none(), Scalar::none()]].concat()
        );
    }

    #[test]
    fn test_get_data_by_pkeys_preserves_order() {
        let store = store();
        let ctx = context();
        let data = ctx
            .get_data_by_pkeys(&store, &[Scalar::from(3i64), Scalar::from(1i64)])
            .unwrap();
        assert_eq!(data, [row(3, "z"), row(1, "x")].concat());
    }

    #[test]
    fn test_get_pkeys_is_unimplemented() {
        let ctx = context();
        let err = ctx.get_pkeys(&[(0, 0)]).unwrap_err();
        assert!(matches!(err, Error::Unimplemented { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_column_metadata() {
        let store = store();
        let ctx = context();
        assert_eq!(ctx.get_column_name(1), "b");
        assert_eq!(ctx.get_column_name(2), "");
        assert_eq!(ctx.get_column_names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ctx.get_column_dtype(&store, 0), DataType::Int64);
        assert_eq!(ctx.get_column_dtype(&store, 2), DataType::None);
    }

    #[test]
    fn test_counts_are_live() {
        let mut store = store();
        let ctx = context();
        assert_eq!(ctx.get_row_count(&store), 3);
        store.rows.push(row(4, "w"));
        assert_eq!(ctx.get_row_count(&store), 4);
        assert_eq!(ctx.get_column_count(&store), 2);
    }

    #[test]
    fn test_flags_and_classification() {
        let mut ctx = context();
        assert_eq!(ctx.sidedness(), 0);
        assert!(ctx.get_deltas_enabled());

        ctx.notify(&StepBatch::new(batch(&[(1, 0)]))).unwrap();
        assert!(ctx.has_deltas());
        ctx.reset();
        assert!(!ctx.has_deltas());
        assert_eq!(ctx.get_delta_pkeys().len(), 1);

        ctx.notify(&StepBatch::new(batch(&[(2, 0)]))).unwrap();
        ctx.clear_deltas();
        assert!(!ctx.has_deltas());
        assert_eq!(ctx.get_delta_pkeys().len(), 2);
    }

    #[test]
    fn test_repr() {
        let ctx = context();
        assert!(ctx.repr().starts_with("UnitContext<0x"));
    }
}
