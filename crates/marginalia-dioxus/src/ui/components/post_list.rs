use dioxus::prelude::*;
use marginalia_engine::{DateFormat, Post, format_date};

#[component]
pub fn PostList(posts: Vec<Post>, selected: Option<String>, on_select: Callback<String>) -> Element {
    rsx! {
        ul {
            class: "post-list",
            for post in posts {
                li {
                    key: "{post.slug}",
                    class: if selected.as_deref() == Some(post.slug.as_str()) {
                        "post-item selected"
                    } else {
                        "post-item"
                    },
                    onclick: {
                        let slug = post.slug.clone();
                        move |_| on_select.call(slug.clone())
                    },
                    span { class: "post-title", "{post.title}" }
                    if !post.published {
                        span { class: "draft-badge", "draft" }
                    }
                    time { class: "post-date", {format_date(post.created_at, DateFormat::Long)} }
                }
            }
        }
    }
}
