use crate::templates::components::segment_table::RowVm;
use crate::templates::components::{pager, segment_table};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct GroupVm {
    pub title: &'static str,
    /// Query-parameter key for this group's pagination.
    pub key: &'static str,
    pub total_rows: usize,
    pub page: usize,
    pub max_page: usize,
    pub rows: Vec<RowVm>,
}

pub struct DashboardVm {
    pub snapshot_day: String,
    /// "All", active seller names, then "Unassigned".
    pub seller_options: Vec<String>,
    pub selected_seller: String,
    /// Query string carrying the current filter + pagination, minus the
    /// parameter being changed by a link.
    pub base_query: String,
    pub groups: Vec<GroupVm>,
    pub segment_counts: Vec<(&'static str, usize)>,
    pub total_customers: usize,
}

pub fn dashboard_page(vm: &DashboardVm) -> Markup {
    desktop_layout(
        "Dashboard",
        true,
        html! {
            main class="container" {
                h1 { "📨 Outreach by segment" }
                p { "Snapshot of " strong { (vm.snapshot_day) } " · " (vm.total_customers) " customers" }

                form action="/dashboard" method="get" class="filter" {
                    label for="seller" { "Filter by seller:" }
                    select name="seller" id="seller" onchange="this.form.submit()" {
                        @for option in &vm.seller_options {
                            option value=(option) selected[*option == vm.selected_seller] { (option) }
                        }
                    }
                }

                form action="/messages/mark" method="post" {
                    @for group in &vm.groups {
                        section class="card" {
                            h3 { (group.title) " (" (group.total_rows) " customers)" }
                            @if group.rows.is_empty() {
                                p class="muted" { "No customers in this group." }
                            } @else {
                                (segment_table(&group.rows))
                                (pager(&vm.base_query, group.key, group.page, group.max_page))
                            }
                        }
                    }
                    button type="submit" { "📅 Save message marks" }
                }

                section class="card" {
                    h3 { "📊 Customers per segment" }
                    table class="segment-counts" {
                        @for (label, count) in &vm.segment_counts {
                            tr {
                                td { (label) }
                                td { (count) }
                            }
                        }
                    }
                }

                section class="card" {
                    h3 { "⬇️ Export" }
                    a href="/export.csv" { "📥 Download CSV" }
                    " · "
                    a href="/export.xlsx" { "📥 Download Excel" }
                }
            }
        },
    )
}

pub struct RunVm {
    pub kind: String,
    pub started: String,
    pub outcome: String,
}

/// Shown when this month's snapshot was never generated: manual operations
/// plus recent run history so a failed attempt is visible.
pub fn no_snapshot_page(snapshot_day: &str, runs: &[RunVm]) -> Markup {
    desktop_layout(
        "Dashboard",
        true,
        html! {
            main class="container" {
                h1 { "📦 RFV Snapshot" }
                p class="warning" {
                    "⚠️ Snapshot for " (snapshot_day) " does not exist yet. Generate it manually."
                }
                section class="card" {
                    h3 { "⚙️ Manual operations" }
                    form action="/data/update" method="post" style="display:inline" {
                        button type="submit" { "🔄 Update orders and clients" }
                    }
                    form action="/snapshot/generate" method="post" style="display:inline" {
                        button type="submit" { "📊 Generate monthly snapshot" }
                    }
                }
                @if !runs.is_empty() {
                    section class="card" {
                        h3 { "🕓 Recent runs" }
                        table {
                            @for run in runs {
                                tr {
                                    td { (run.kind) }
                                    td { (run.started) }
                                    td { (run.outcome) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
