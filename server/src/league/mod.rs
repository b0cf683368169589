//! League bookkeeping: leaderboard aggregation, entry reconciliation and the
//! money view derived from chip counts.

pub mod leaderboard;
pub mod money;
pub mod reconcile;
