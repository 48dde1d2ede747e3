pub mod form;
pub mod list;

pub use form::{FormController, FormMode, FormState, SubmitOutcome};
pub use list::{
    page_window, EmptyPagePolicy, FetchOutcome, ListController, ListSnapshot, LoadStatus, PagedSource,
    RefreshSignal,
};
