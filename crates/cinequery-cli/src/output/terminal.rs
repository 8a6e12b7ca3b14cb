//! Terminal output formatter

use super::{join_list, FormatOptions};
use cinequery_core::MovieDocument;

pub fn format_movies(movies: &[MovieDocument], options: &FormatOptions) -> String {
    if movies.is_empty() {
        return "No movies found\n".to_string();
    }

    let mut output = String::new();

    for movie in movies {
        let rating = movie
            .imdb_rating()
            .map(|r| format!("{:>4.1}", r))
            .unwrap_or_else(|| "   -".to_string());
        let year = movie
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        output.push_str(&format!("{} {} {}", rating, year, movie.display_title()));
        if let Some(id) = movie.id_string() {
            output.push_str(&format!(" #{}", id));
        }
        output.push('\n');

        if movie.genres.is_some() || movie.directors.is_some() {
            output.push_str(&format!(
                "          {} | {}\n",
                join_list(&movie.genres),
                join_list(&movie.directors)
            ));
        }

        if options.full {
            if let Some(ref plot) = movie.plot {
                output.push_str(&format!("          {}\n", plot));
            }
        }
    }

    output
}
