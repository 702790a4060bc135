use dioxus::prelude::*;
use marginalia_config::Config;
use marginalia_engine::{Post, PostStore};
use std::path::PathBuf;

use super::components::{Article, PostList};

const MARGINALIA_CSS: &str = include_str!("../assets/marginalia.css");

#[component]
pub fn App(posts_path: PathBuf) -> Element {
    let posts = use_signal(|| {
        match PostStore::open(&posts_path).and_then(|store| store.list_posts()) {
            Ok(posts) => posts,
            Err(e) => {
                log::error!("failed to load posts: {e}");
                Vec::new()
            }
        }
    });
    let mut selected_slug = use_signal(|| None::<String>);

    let site_title = Config::global()
        .map(|config| config.site_title.clone())
        .unwrap_or_else(|| "Marginalia".to_string());

    let selected_post: Option<Post> = selected_slug.read().as_ref().and_then(|slug| {
        posts
            .read()
            .iter()
            .find(|post| &post.slug == slug)
            .cloned()
    });

    rsx! {
        style { {MARGINALIA_CSS} }
        div {
            class: "app-container",
            aside {
                class: "sidebar",
                h2 { "{site_title}" }
                PostList {
                    posts: posts.read().clone(),
                    selected: selected_slug.read().clone(),
                    on_select: move |slug: String| {
                        selected_slug.set(Some(slug));
                    },
                }
            }
            main {
                class: "main-content",
                if let Some(post) = selected_post {
                    Article { post }
                } else {
                    p { class: "placeholder", "Select a post to read it." }
                }
            }
        }
    }
}
