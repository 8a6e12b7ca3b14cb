//! CSV output formatter

use super::join_list;
use cinequery_core::MovieDocument;
use std::io;

const HEADER: [&str; 6] = ["id", "title", "year", "genres", "directors", "imdb_rating"];

pub fn format_movies(movies: &[MovieDocument]) -> csv::Result<String> {
    let mut bytes = Vec::new();
    write_movies(&mut bytes, movies)?;
    String::from_utf8(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Write the header and one row per movie
pub fn write_movies<W: io::Write>(out: W, movies: &[MovieDocument]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;

    for m in movies {
        writer.write_record([
            m.id_string().unwrap_or_default(),
            m.title.clone().unwrap_or_default(),
            m.year.map(|y| y.to_string()).unwrap_or_default(),
            join_list(&m.genres),
            join_list(&m.directors),
            m.imdb_rating().map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let movie = MovieDocument::from_value(json!({
            "_id": "1",
            "title": "Crouching Tiger, Hidden Dragon",
            "genres": ["Action", "Drama"],
            "year": 2000
        }))
        .unwrap();

        let output = format_movies(&[movie]).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("id,title,year,genres,directors,imdb_rating"));
        assert_eq!(
            lines.next(),
            Some(r#"1,"Crouching Tiger, Hidden Dragon",2000,"Action, Drama",,"#)
        );
    }

    struct Closed;

    impl io::Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_errors_are_returned() {
        let movie = MovieDocument::from_value(json!({"_id": "1", "title": "Alien"})).unwrap();
        let err = write_movies(Closed, &[movie]).unwrap_err();
        assert!(matches!(err.kind(), csv::ErrorKind::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
