//! Markdown output formatter

use super::{join_list, FormatOptions};
use cinequery_core::MovieDocument;

pub fn format_movies(movies: &[MovieDocument], options: &FormatOptions) -> String {
    let mut output = String::from("# Movies\n\n");

    for (i, m) in movies.iter().enumerate() {
        match m.year {
            Some(year) => output.push_str(&format!("## {}. {} ({})\n\n", i + 1, m.display_title(), year)),
            None => output.push_str(&format!("## {}. {}\n\n", i + 1, m.display_title())),
        }
        if let Some(id) = m.id_string() {
            output.push_str(&format!("- **ID**: `{}`\n", id));
        }
        if m.genres.is_some() {
            output.push_str(&format!("- **Genres**: {}\n", join_list(&m.genres)));
        }
        if m.directors.is_some() {
            output.push_str(&format!("- **Directors**: {}\n", join_list(&m.directors)));
        }
        if let Some(rating) = m.imdb_rating() {
            output.push_str(&format!("- **IMDb**: {:.1}\n", rating));
        }
        if options.full {
            if let Some(ref plot) = m.plot {
                output.push_str(&format!("\n{}\n", plot));
            }
        }
        output.push_str("\n---\n\n");
    }

    if movies.is_empty() {
        output.push_str("*No movies found*\n");
    }

    output
}
