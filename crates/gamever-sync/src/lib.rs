mod reconciler;

pub use reconciler::{
    reconcile_selection, resolve_selection, ReconcilerHandle, SelectionDecision,
    SelectionObserver, SelectionReconciler, SelectionSnapshot, TickOutcome,
    DEFAULT_TICK_INTERVAL,
};
