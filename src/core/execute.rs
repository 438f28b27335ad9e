//! Running translated list queries against a [`DataStore`]
//!
//! The helper ANDs an optional base condition (typically an authorization
//! scope) with the translated filter, so request parameters can narrow a
//! listing but never widen it.
//!
//! With counting enabled the row query and the count query run concurrently
//! and outside any shared transaction: a write landing between them can make
//! `total` disagree with the rows returned. Without counting, `total` is a
//! lower bound and `has_more` is guessed from whether the page came back
//! full.

use crate::core::list_config::ListQueryConfig;
use crate::core::params::QueryInput;
use crate::core::predicate::Predicate;
use crate::core::query::{ListEnvelope, ListMeta};
use crate::core::store::{DataStore, SelectQuery};
use crate::core::translate::ParsedListQuery;
use anyhow::Result;

/// What to run: an already translated query, or raw input plus its config
#[derive(Debug, Clone)]
pub enum ListSource<'a> {
    Parsed(ParsedListQuery),
    Raw {
        input: QueryInput,
        config: &'a ListQueryConfig,
    },
}

impl<'a> ListSource<'a> {
    pub fn raw(input: impl Into<QueryInput>, config: &'a ListQueryConfig) -> Self {
        ListSource::Raw {
            input: input.into(),
            config,
        }
    }

    pub fn resolve(self) -> ParsedListQuery {
        match self {
            ListSource::Parsed(parsed) => parsed,
            ListSource::Raw { input, config } => config.parse(input),
        }
    }
}

impl From<ParsedListQuery> for ListSource<'_> {
    fn from(parsed: ParsedListQuery) -> Self {
        ListSource::Parsed(parsed)
    }
}

/// Shape of the value returned by [`execute`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Rows,
    Envelope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Issue an exact count query alongside the row query
    pub count: bool,
    pub mode: OutputMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            count: true,
            mode: OutputMode::Rows,
        }
    }
}

impl RunOptions {
    /// Skip the count query
    pub fn without_count(mut self) -> Self {
        self.count = false;
        self
    }

    pub fn envelope(mut self) -> Self {
        self.mode = OutputMode::Envelope;
        self
    }
}

/// Rows of one page with the pagination facts callers usually need
#[derive(Debug, Clone, PartialEq)]
pub struct ListRows<R> {
    pub rows: Vec<R>,
    pub total: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListOutput<R> {
    Rows(ListRows<R>),
    Envelope(ListEnvelope<R>),
}

impl<R> ListOutput<R> {
    pub fn into_rows(self) -> Option<ListRows<R>> {
        match self {
            ListOutput::Rows(rows) => Some(rows),
            ListOutput::Envelope(_) => None,
        }
    }

    pub fn into_envelope(self) -> Option<ListEnvelope<R>> {
        match self {
            ListOutput::Envelope(envelope) => Some(envelope),
            ListOutput::Rows(_) => None,
        }
    }
}

struct Page<R> {
    rows: Vec<R>,
    total: u64,
    has_more: bool,
    limit: u64,
    offset: u64,
}

impl<R> Page<R> {
    fn into_rows(self) -> ListRows<R> {
        ListRows {
            rows: self.rows,
            total: self.total,
            has_more: self.has_more,
        }
    }

    fn into_envelope(self) -> ListEnvelope<R> {
        let meta = ListMeta::with_has_more(
            self.total,
            self.limit,
            self.offset,
            self.rows.len(),
            self.has_more,
        );
        ListEnvelope {
            data: self.rows,
            meta,
        }
    }
}

/// Run a list query and shape the result according to `options.mode`.
///
/// Store errors are returned as-is.
pub async fn execute<'a, S>(
    store: &S,
    table: &str,
    source: impl Into<ListSource<'a>>,
    base: Option<Predicate>,
    options: RunOptions,
) -> Result<ListOutput<S::Row>>
where
    S: DataStore + ?Sized,
{
    Ok(match options.mode {
        OutputMode::Rows => {
            ListOutput::Rows(run_list_query(store, table, source, base, options.count).await?)
        }
        OutputMode::Envelope => ListOutput::Envelope(
            run_list_envelope(store, table, source, base, options.count).await?,
        ),
    })
}

/// [`execute`] returning rows, `total` and `has_more`
pub async fn run_list_query<'a, S>(
    store: &S,
    table: &str,
    source: impl Into<ListSource<'a>>,
    base: Option<Predicate>,
    count: bool,
) -> Result<ListRows<S::Row>>
where
    S: DataStore + ?Sized,
{
    let page = fetch_page(store, table, source.into().resolve(), base, count).await?;
    Ok(page.into_rows())
}

/// [`execute`] returning a ready [`ListEnvelope`]
pub async fn run_list_envelope<'a, S>(
    store: &S,
    table: &str,
    source: impl Into<ListSource<'a>>,
    base: Option<Predicate>,
    count: bool,
) -> Result<ListEnvelope<S::Row>>
where
    S: DataStore + ?Sized,
{
    let page = fetch_page(store, table, source.into().resolve(), base, count).await?;
    Ok(page.into_envelope())
}

async fn fetch_page<S>(
    store: &S,
    table: &str,
    parsed: ParsedListQuery,
    base: Option<Predicate>,
    count: bool,
) -> Result<Page<S::Row>>
where
    S: DataStore + ?Sized,
{
    let filter = parsed.filter_with(base.as_ref());
    let (_, order_by, limit, offset) = parsed.into_parts();
    let query = SelectQuery {
        filter,
        order_by,
        limit,
        offset,
    };

    let (rows, total, has_more) = if count {
        let (rows, counted) = tokio::try_join!(
            store.select(table, &query),
            store.count(table, query.filter.as_ref())
        )?;
        let total = counted.unwrap_or(0);
        let has_more = offset.saturating_add(rows.len() as u64) < total;
        (rows, total, has_more)
    } else {
        let rows = store.select(table, &query).await?;
        let total = offset.saturating_add(rows.len() as u64);
        let has_more = rows.len() as u64 == limit;
        (rows, total, has_more)
    };

    tracing::debug!(
        table,
        limit,
        offset,
        count,
        rows = rows.len(),
        total,
        has_more,
        "list query executed"
    );

    Ok(Page {
        rows,
        total,
        has_more,
        limit,
        offset,
    })
}
