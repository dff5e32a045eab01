//! `<picture>` markup for published variants.
//!
//! Renders the element a page embeds to let the browser pick a size and
//! format:
//!
//! ```html
//! <picture>
//!   <source type="image/webp" srcset="assets/images/logo-480.webp 480w, ..." sizes="...">
//!   <source type="image/png" srcset="assets/images/logo-480.png 480w, ..." sizes="...">
//!   <img src="assets/images/logo-1024.png" alt="Logo" class="hero">
//! </picture>
//! ```
//!
//! Candidates are listed smallest first. The `sizes` attribute maps each
//! breakpoint but the largest to a `max-width` condition and falls back to
//! the largest size.

use crate::config::MarkupConfig;
use crate::naming::derived_file_name;
use crate::types::AssetFormat;
use maud::{Markup, html};

fn url(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{prefix}/{file_name}")
    }
}

fn srcset(name: &str, sizes: &[u32], format: AssetFormat, prefix: &str) -> String {
    sizes
        .iter()
        .map(|&size| {
            format!(
                "{} {}w",
                url(prefix, &derived_file_name(name, size, format)),
                size
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `sizes` attribute for ascending, deduplicated `sizes`.
fn sizes_attr(sizes: &[u32]) -> String {
    let Some((largest, rest)) = sizes.split_last() else {
        return String::new();
    };
    rest.iter()
        .map(|s| format!("(max-width: {s}px) {s}px"))
        .chain(std::iter::once(format!("{largest}px")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a `<picture>` for the image `name` (basename, no extension).
///
/// Returns `None` when there are no sizes to reference.
pub fn picture(
    name: &str,
    alt: &str,
    class: Option<&str>,
    sizes: &[u32],
    config: &MarkupConfig,
) -> Option<Markup> {
    let mut sizes = sizes.to_vec();
    sizes.sort_unstable();
    sizes.dedup();
    let largest = *sizes.last()?;

    let fallback = config.fallback_size.unwrap_or(largest);
    let prefix = config.url_prefix.as_str();
    let sizes_value = sizes_attr(&sizes);
    let src = url(
        prefix,
        &derived_file_name(name, fallback, AssetFormat::Fallback),
    );

    Some(html! {
        picture {
            @for format in AssetFormat::ALL {
                source type=(format.mime_type())
                    srcset=(srcset(name, &sizes, format, prefix))
                    sizes=(sizes_value);
            }
            img src=(src) alt=(alt) class=[class];
        }
    })
}
