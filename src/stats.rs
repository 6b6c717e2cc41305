//! Derived dashboard metrics.
//!
//! Everything here is computed from the current record sets at query time;
//! nothing is cached or persisted. The numeric cores are pure functions over
//! slices so they can be exercised without a store; thin async wrappers fetch
//! the rows from a [`Database`] first.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{
    ClientRecord, ClientStore as _, Database, ProjectRecord, ProjectStatus, ProjectStore as _,
};
use crate::error::StoreError;

/// Relative calendar window restricting aggregation to recent deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    All,
    Month,
    Quarter,
    Year,
}

impl TimeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// Parse a query-string value. Unknown values fall back to `All`, the
    /// dashboard's default view.
    pub fn from_query_value(value: &str) -> Self {
        match value {
            "month" => Self::Month,
            "quarter" => Self::Quarter,
            "year" => Self::Year,
            _ => Self::All,
        }
    }

    /// Inclusive first and last day of the calendar period containing
    /// `today`. `All` applies no restriction.
    ///
    /// Every filtered view shares this single definition, so the stats
    /// summary and the earnings report can never disagree about which
    /// projects a filter covers.
    pub fn window(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::All => None,
            Self::Month => {
                let start = month_start(today.year(), today.month());
                Some((start, month_end(today.year(), today.month())))
            }
            Self::Quarter => {
                let first_month = 1 + 3 * ((today.month() - 1) / 3);
                let start = month_start(today.year(), first_month);
                Some((start, month_end(today.year(), first_month + 2)))
            }
            Self::Year => Some((
                month_start(today.year(), 1),
                month_end(today.year(), 12),
            )),
        }
    }
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    month_start(next_year, next_month)
        .pred_opt()
        .unwrap_or(NaiveDate::MAX)
}

fn in_window(project: &ProjectRecord, window: Option<(NaiveDate, NaiveDate)>) -> bool {
    match window {
        None => true,
        Some((start, end)) => project.deadline >= start && project.deadline <= end,
    }
}

/// Landing-page metrics over the full record sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub client_count: usize,
    pub project_count: usize,
    pub total_earnings: Decimal,
    /// Projects whose status is not `Completed`.
    pub active_project_count: usize,
}

/// Metrics for the stats panel, over the time-filtered project set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub total_earnings: Decimal,
    pub projects_completed: usize,
    /// Distinct non-empty client names among the filtered projects.
    pub active_clients: usize,
    pub average_project_value: Decimal,
}

/// Earnings for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodEarnings {
    pub year: i32,
    pub month: u32,
    pub earnings: Decimal,
}

pub fn summarize_dashboard(
    clients: &[ClientRecord],
    projects: &[ProjectRecord],
) -> DashboardSummary {
    let total_earnings = projects
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc + p.fee)
        .round_dp(2);
    let active_project_count = projects
        .iter()
        .filter(|p| p.status != ProjectStatus::Completed)
        .count();

    DashboardSummary {
        client_count: clients.len(),
        project_count: projects.len(),
        total_earnings,
        active_project_count,
    }
}

pub fn summarize_stats(
    projects: &[ProjectRecord],
    filter: TimeFilter,
    today: NaiveDate,
) -> StatsSummary {
    let window = filter.window(today);
    let filtered: Vec<&ProjectRecord> = projects.iter().filter(|p| in_window(p, window)).collect();

    let total_earnings = filtered
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc + p.fee)
        .round_dp(2);
    let projects_completed = filtered
        .iter()
        .filter(|p| p.status == ProjectStatus::Completed)
        .count();
    let active_clients = filtered
        .iter()
        .map(|p| p.client_name.trim())
        .filter(|name| !name.is_empty())
        .collect::<HashSet<_>>()
        .len();
    let average_project_value = if filtered.is_empty() {
        Decimal::ZERO
    } else {
        (total_earnings / Decimal::from(filtered.len() as u64)).round_dp(2)
    };

    StatsSummary {
        total_earnings,
        projects_completed,
        active_clients,
        average_project_value,
    }
}

/// Group the filtered projects by the (year, month) of their deadline and
/// sum fees per group, in chronological order.
pub fn earnings_by_month(
    projects: &[ProjectRecord],
    filter: TimeFilter,
    today: NaiveDate,
) -> Vec<PeriodEarnings> {
    let window = filter.window(today);
    let mut buckets: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for project in projects.iter().filter(|p| in_window(p, window)) {
        let key = (project.deadline.year(), project.deadline.month());
        *buckets.entry(key).or_insert(Decimal::ZERO) += project.fee;
    }

    buckets
        .into_iter()
        .map(|((year, month), earnings)| PeriodEarnings {
            year,
            month,
            earnings: earnings.round_dp(2),
        })
        .collect()
}

pub async fn dashboard_summary(db: &dyn Database) -> Result<DashboardSummary, StoreError> {
    let clients = db.list_clients().await?;
    let projects = db.list_projects().await?;
    Ok(summarize_dashboard(&clients, &projects))
}

pub async fn stats_summary(
    db: &dyn Database,
    filter: TimeFilter,
    today: NaiveDate,
) -> Result<StatsSummary, StoreError> {
    let projects = db.list_projects().await?;
    Ok(summarize_stats(&projects, filter, today))
}

pub async fn earnings_by_period(
    db: &dyn Database,
    filter: TimeFilter,
    today: NaiveDate,
) -> Result<Vec<PeriodEarnings>, StoreError> {
    let projects = db.list_projects().await?;
    Ok(earnings_by_month(&projects, filter, today))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn project(
        id: i64,
        client_name: &str,
        status: ProjectStatus,
        deadline: NaiveDate,
        fee: Decimal,
    ) -> ProjectRecord {
        ProjectRecord {
            id,
            name: format!("project-{id}"),
            client_name: client_name.to_string(),
            status,
            deadline,
            fee,
        }
    }

    #[test]
    fn month_window_covers_exactly_the_current_month() {
        let today = date(2026, 8, 25);
        let (start, end) = TimeFilter::Month.window(today).expect("window");
        assert_eq!(start, date(2026, 8, 1));
        assert_eq!(end, date(2026, 8, 31));
    }

    #[test]
    fn month_window_handles_december() {
        let today = date(2025, 12, 3);
        let (start, end) = TimeFilter::Month.window(today).expect("window");
        assert_eq!(start, date(2025, 12, 1));
        assert_eq!(end, date(2025, 12, 31));
    }

    #[test]
    fn quarter_window_spans_three_months() {
        let today = date(2026, 8, 25);
        let (start, end) = TimeFilter::Quarter.window(today).expect("window");
        assert_eq!(start, date(2026, 7, 1));
        assert_eq!(end, date(2026, 9, 30));

        let first_quarter = TimeFilter::Quarter.window(date(2026, 2, 1)).expect("window");
        assert_eq!(first_quarter, (date(2026, 1, 1), date(2026, 3, 31)));
    }

    #[test]
    fn year_window_spans_the_calendar_year() {
        let (start, end) = TimeFilter::Year.window(date(2026, 8, 25)).expect("window");
        assert_eq!(start, date(2026, 1, 1));
        assert_eq!(end, date(2026, 12, 31));
    }

    #[test]
    fn all_filter_has_no_window() {
        assert_eq!(TimeFilter::All.window(date(2026, 8, 25)), None);
    }

    #[test]
    fn unknown_query_values_fall_back_to_all() {
        assert_eq!(TimeFilter::from_query_value("month"), TimeFilter::Month);
        assert_eq!(TimeFilter::from_query_value("bogus"), TimeFilter::All);
        assert_eq!(TimeFilter::from_query_value(""), TimeFilter::All);
    }

    #[test]
    fn empty_sets_produce_zero_valued_aggregates() {
        let dashboard = summarize_dashboard(&[], &[]);
        assert_eq!(dashboard.client_count, 0);
        assert_eq!(dashboard.project_count, 0);
        assert_eq!(dashboard.total_earnings, Decimal::ZERO);
        assert_eq!(dashboard.active_project_count, 0);

        let stats = summarize_stats(&[], TimeFilter::All, date(2026, 8, 25));
        assert_eq!(stats.total_earnings, Decimal::ZERO);
        assert_eq!(stats.projects_completed, 0);
        assert_eq!(stats.active_clients, 0);
        assert_eq!(stats.average_project_value, Decimal::ZERO);

        assert!(earnings_by_month(&[], TimeFilter::Year, date(2026, 8, 25)).is_empty());
    }

    #[test]
    fn stats_totals_and_average_round_to_cents() {
        let today = date(2026, 8, 25);
        let projects = vec![
            project(1, "Acme", ProjectStatus::Completed, date(2026, 8, 5), dec!(100)),
            project(2, "Beta", ProjectStatus::InProgress, date(2026, 8, 12), dec!(250)),
            project(3, "Acme", ProjectStatus::Planning, date(2026, 8, 20), dec!(650.50)),
        ];

        let stats = summarize_stats(&projects, TimeFilter::All, today);
        assert_eq!(stats.total_earnings, dec!(1000.50));
        assert_eq!(stats.average_project_value, dec!(333.50));
        assert_eq!(stats.projects_completed, 1);
        assert_eq!(stats.active_clients, 2);
    }

    #[test]
    fn filters_drop_projects_outside_the_window() {
        let today = date(2026, 8, 25);
        let projects = vec![
            project(1, "Acme", ProjectStatus::Completed, date(2026, 8, 5), dec!(100)),
            // Previous month: inside quarter and year, outside month.
            project(2, "Beta", ProjectStatus::Completed, date(2026, 7, 30), dec!(200)),
            // Previous year: outside every bounded window.
            project(3, "Gamma", ProjectStatus::Completed, date(2025, 8, 25), dec!(400)),
        ];

        let month = summarize_stats(&projects, TimeFilter::Month, today);
        assert_eq!(month.total_earnings, dec!(100));
        assert_eq!(month.active_clients, 1);

        let quarter = summarize_stats(&projects, TimeFilter::Quarter, today);
        assert_eq!(quarter.total_earnings, dec!(300));

        let year = summarize_stats(&projects, TimeFilter::Year, today);
        assert_eq!(year.total_earnings, dec!(300));

        let all = summarize_stats(&projects, TimeFilter::All, today);
        assert_eq!(all.total_earnings, dec!(700));
    }

    #[test]
    fn earnings_groups_are_disjoint_and_chronological() {
        let today = date(2026, 8, 25);
        let projects = vec![
            project(1, "Acme", ProjectStatus::Completed, date(2026, 3, 10), dec!(100)),
            project(2, "Acme", ProjectStatus::Completed, date(2026, 3, 28), dec!(50)),
            project(3, "Beta", ProjectStatus::InProgress, date(2026, 1, 15), dec!(300)),
            project(4, "Beta", ProjectStatus::Planning, date(2025, 11, 2), dec!(75)),
        ];

        let earnings = earnings_by_month(&projects, TimeFilter::All, today);
        assert_eq!(
            earnings,
            vec![
                PeriodEarnings {
                    year: 2025,
                    month: 11,
                    earnings: dec!(75)
                },
                PeriodEarnings {
                    year: 2026,
                    month: 1,
                    earnings: dec!(300)
                },
                PeriodEarnings {
                    year: 2026,
                    month: 3,
                    earnings: dec!(150)
                },
            ]
        );
    }

    #[test]
    fn earnings_sum_matches_stats_total_for_every_filter() {
        let today = date(2026, 8, 25);
        let projects = vec![
            project(1, "Acme", ProjectStatus::Completed, date(2026, 8, 5), dec!(120.25)),
            project(2, "Beta", ProjectStatus::InProgress, date(2026, 7, 14), dec!(80.75)),
            project(3, "Gamma", ProjectStatus::Planning, date(2026, 2, 1), dec!(990)),
            project(4, "Acme", ProjectStatus::Completed, date(2025, 6, 30), dec!(45.50)),
        ];

        for filter in [
            TimeFilter::All,
            TimeFilter::Month,
            TimeFilter::Quarter,
            TimeFilter::Year,
        ] {
            let stats = summarize_stats(&projects, filter, today);
            let earnings = earnings_by_month(&projects, filter, today);
            let grouped_total = earnings
                .iter()
                .fold(Decimal::ZERO, |acc, e| acc + e.earnings);
            assert_eq!(
                grouped_total,
                stats.total_earnings,
                "filter {} disagrees",
                filter.as_str()
            );
        }
    }

    #[test]
    fn dashboard_counts_active_projects() {
        let projects = vec![
            project(1, "Acme", ProjectStatus::Completed, date(2026, 8, 5), dec!(100)),
            project(2, "Beta", ProjectStatus::InProgress, date(2026, 8, 12), dec!(250)),
            project(3, "", ProjectStatus::Planning, date(2026, 8, 20), dec!(0)),
        ];
        let clients = vec![ClientRecord {
            id: 1,
            name: "Acme".to_string(),
            email: String::new(),
            phone: String::new(),
            lead_source: "Referral".to_string(),
        }];

        let dashboard = summarize_dashboard(&clients, &projects);
        assert_eq!(dashboard.client_count, 1);
        assert_eq!(dashboard.project_count, 3);
        assert_eq!(dashboard.active_project_count, 2);
        assert_eq!(dashboard.total_earnings, dec!(350));
    }

    #[test]
    fn blank_client_names_do_not_count_as_active() {
        let projects = vec![
            project(1, "  ", ProjectStatus::Planning, date(2026, 8, 5), dec!(10)),
            project(2, "Acme", ProjectStatus::Planning, date(2026, 8, 6), dec!(10)),
            project(3, "acme", ProjectStatus::Planning, date(2026, 8, 7), dec!(10)),
        ];

        let stats = summarize_stats(&projects, TimeFilter::All, date(2026, 8, 25));
        // "Acme" and "acme" are distinct names; the blank one is dropped.
        assert_eq!(stats.active_clients, 2);
    }
}
