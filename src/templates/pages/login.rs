use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn login_page(failed: bool) -> Markup {
    desktop_layout(
        "Sign in",
        false,
        html! {
            main class="container narrow" {
                h1 { "🔐 Sign in" }
                @if failed {
                    p class="error" { "❌ Access denied - wrong password" }
                }
                form action="/login" method="post" {
                    label for="password" { "Password" }
                    input type="password" name="password" id="password" required;
                    button type="submit" { "Enter" }
                }
            }
        },
    )
}
