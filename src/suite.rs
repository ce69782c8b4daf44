//! Suite runner
//!
//! Runs each suite's query pairs through the comparison harness against
//! one library, writing every report as it completes.

use std::fmt;
use std::io::Write;
use std::time::Instant;

use crate::bench::Comparator;
use crate::config::BenchConfig;
use crate::models::ComparisonRecord;
use crate::queries::{challenge, demo, optimize};
use crate::store::Library;
use crate::util::format_elapsed;
use crate::Result;

/// Rows the seeder creates besides the generated ones
const FIXED_BOOKS: usize = 6;

/// A named group of comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    /// N+1 lookups, indexes and counts, timings only
    Demo,
    /// Raw SQL and eager loading strategies, results compared
    Challenge,
    /// Loops rewritten as single queries, results compared
    Optimize,
}

impl Suite {
    pub const ALL: [Suite; 3] = [Suite::Demo, Suite::Challenge, Suite::Optimize];

    pub fn name(&self) -> &'static str {
        match self {
            Suite::Demo => "demo",
            Suite::Challenge => "challenge",
            Suite::Optimize => "optimize",
        }
    }

    /// Whether the suite checks that both strategies agree
    pub fn checks_equality(&self) -> bool {
        !matches!(self, Suite::Demo)
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Runs suites against a library and collects their records
pub struct SuiteRunner<'a, W: Write> {
    library: &'a Library,
    comparator: Comparator,
    out: W,
    records: Vec<ComparisonRecord>,
}

impl<'a, W: Write> SuiteRunner<'a, W> {
    pub fn new(library: &'a Library, config: &BenchConfig, out: W) -> Self {
        Self {
            library,
            comparator: Comparator::new().with_preview_chars(config.preview_chars),
            out,
            records: Vec::new(),
        }
    }

    /// Run one suite, writing its reports
    pub fn run(&mut self, suite: Suite) -> Result<()> {
        let start = Instant::now();
        let before = self.records.len();

        match suite {
            Suite::Demo => self.run_demo()?,
            Suite::Challenge => self.run_challenge()?,
            Suite::Optimize => self.run_optimize()?,
        }

        log::info!(
            "Suite {} ran {} comparisons in {}",
            suite,
            self.records.len() - before,
            format_elapsed(start.elapsed())
        );
        Ok(())
    }

    /// Run every suite in order
    pub fn run_all(&mut self) -> Result<()> {
        for suite in Suite::ALL {
            self.run(suite)?;
        }
        Ok(())
    }

    /// Records collected so far
    pub fn records(&self) -> &[ComparisonRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ComparisonRecord> {
        self.records
    }

    fn heading(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "\n\n{}", text)?;
        Ok(())
    }

    fn pair<T, FA, FB>(
        &mut self,
        suite: Suite,
        scenario: &str,
        name_a: &str,
        f_a: FA,
        name_b: &str,
        f_b: FB,
    ) -> Result<()>
    where
        T: PartialEq + fmt::Debug,
        FA: FnOnce() -> Result<T>,
        FB: FnOnce() -> Result<T>,
    {
        let report = self
            .comparator
            .with_equality_check(suite.checks_equality())
            .run(name_a, f_a, name_b, f_b)?;
        report.write_to(&mut self.out)?;
        self.records
            .push(ComparisonRecord::from_report(&report, suite.name(), scenario));
        Ok(())
    }

    fn run_demo(&mut self) -> Result<()> {
        let library = self.library;
        let generated = generated_books(library)?;
        let suite = Suite::Demo;

        self.heading("Fetching small number of titles")?;
        let few: Vec<String> = vec!["Things Fall Apart".into(), "The Vegetarian".into()];
        self.pair(
            suite,
            "small number of titles",
            "books_by_title_bulk",
            || demo::books_by_title_bulk(library, &few),
            "books_by_title",
            || demo::books_by_title(library, &few),
        )?;

        self.heading("Fetching large number of titles")?;
        let many: Vec<String> = (0..generated.min(5_000))
            .map(|i| format!("Book {}", i))
            .collect();
        self.pair(
            suite,
            "large number of titles",
            "books_by_title_bulk",
            || demo::books_by_title_bulk(library, &many),
            "books_by_title",
            || demo::books_by_title(library, &many),
        )?;

        self.heading("Fetching single book")?;
        let probe = probe_title(generated);
        self.pair(
            suite,
            "single book",
            "book_by_title",
            || demo::book_by_title(library, &probe),
            "book_by_title_without_index",
            || demo::book_by_title_without_index(library, &probe),
        )?;

        self.heading("Counting books by author")?;
        self.pair(
            suite,
            "counting books by author",
            "count_books_by_author",
            || demo::count_books_by_author(library, 2),
            "count_books_by_author_db",
            || demo::count_books_by_author_db(library, 2),
        )?;

        self.heading("Getting books with author names")?;
        self.pair(
            suite,
            "books with author names",
            "books_with_author_names",
            || demo::books_with_author_names(library),
            "books_with_author_names_joined",
            || demo::books_with_author_names_joined(library),
        )
    }

    fn run_challenge(&mut self) -> Result<()> {
        let library = self.library;
        let suite = Suite::Challenge;
        let titles = library.book_titles()?;

        self.pair(
            suite,
            "genres of books",
            "book_genres_batched",
            || challenge::book_genres_batched(library, &titles),
            "book_genres_joined",
            || challenge::book_genres_joined(library, &titles),
        )?;

        self.pair(
            suite,
            "titles excluding latest books",
            "titles_excluding_latest_raw_sql",
            || challenge::titles_excluding_latest_raw_sql(library),
            "titles_excluding_latest_subquery",
            || challenge::titles_excluding_latest_subquery(library),
        )?;

        self.pair(
            suite,
            "books with author info",
            "books_with_author_info_joined",
            || challenge::books_with_author_info_joined(library),
            "books_with_author_info_batched",
            || challenge::books_with_author_info_batched(library),
        )
    }

    fn run_optimize(&mut self) -> Result<()> {
        let library = self.library;
        let suite = Suite::Optimize;
        let counts = library.counts()?;

        let author_ids: Vec<i64> = (1..=counts.authors.min(49_999) as i64).collect();
        self.pair(
            suite,
            "author intros",
            "author_intros",
            || optimize::author_intros(library, &author_ids),
            "author_intros_optimized",
            || optimize::author_intros_optimized(library, &author_ids),
        )?;

        self.pair(
            suite,
            "highest page count",
            "highest_page_count_title",
            || optimize::highest_page_count_title(library),
            "highest_page_count_title_optimized",
            || optimize::highest_page_count_title_optimized(library),
        )?;

        let book_ids: Vec<i64> = (3..=counts.books.min(50_999) as i64).collect();
        self.pair(
            suite,
            "book intros",
            "book_intros",
            || optimize::book_intros(library, &book_ids),
            "book_intros_optimized",
            || optimize::book_intros_optimized(library, &book_ids),
        )
    }
}

/// Number of `Book {i}` rows in the library
fn generated_books(library: &Library) -> Result<usize> {
    Ok(library.counts()?.books.saturating_sub(FIXED_BOOKS))
}

/// A generated title deep in the table, falling back to a fixed one
fn probe_title(generated: usize) -> String {
    match generated {
        0 => "Pear Book".to_string(),
        n => format!("Book {}", n.min(5_002) - 1),
    }
}
