use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, signed_in: bool, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href="/static/main.css";
            }
            body {
                header class="flex items-center justify-between px-6 py-3 shadow" {
                    h3 { "📦 RFV Snapshot" }
                    nav {
                        ul {
                            li { a href="/dashboard" { "Dashboard" } }
                        }
                    }
                    @if signed_in {
                        form action="/logout" method="post" {
                            button type="submit" { "Sign out" }
                        }
                    } @else {
                        a href="/login" class="text-base font-medium hover:text-blue-600" { "Sign in" }
                    }
                }
                (content)
            }
        }
    }
}
