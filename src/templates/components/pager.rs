use maud::{html, Markup};

/// Previous/next links for one outreach group. Pagination state lives in the
/// query string (one `pg_<group>` parameter per group), so paging one group
/// keeps the others where they were.
pub fn pager(base_query: &str, group_key: &str, page: usize, max_page: usize) -> Markup {
    let link = |target: usize| format!("/dashboard?{base_query}&pg_{group_key}={target}");

    html! {
        div class="pager" {
            @if page > 0 {
                a href=(link(page - 1)) { "⬅️ Previous" }
            }
            @if max_page > 0 {
                span class="pager-status" { "Page " (page + 1) " of " (max_page + 1) }
            }
            @if page < max_page {
                a href=(link(page + 1)) { "Next ➡️" }
            }
        }
    }
}
