use chrono::{DateTime, NaiveDate, Utc};

/// Clock trait - the only fact the ledger takes from its environment.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Today's calendar date in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
