//! Pure salary and fee arithmetic.
//!
//! Everything in here works on figures already fetched by the caller: no I/O and no shared
//! state, so it can run from a request handler, a batch job or a test alike.

mod error;
mod money;
mod reconcile;
mod salary;
mod timeline;

pub use error::LedgerError;
pub use money::PaymentStatus;
pub use reconcile::{reconcile, PaymentSummary};
pub use salary::{calculate, AttendanceInput, SalaryBreakdown};
pub use timeline::{build_timeline, FeeItem, FeeRecord, FeeTimelineEntry, MonthRange, TimelineStatus, YearMonth};
