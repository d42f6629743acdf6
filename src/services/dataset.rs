use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

/// Loads a movie dataset, picking the format from the file extension
/// (`.csv`, anything else is read as a JSON array)
pub fn load(path: &Path) -> AppResult<Vec<MovieRecord>> {
    let file = File::open(path)?;
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let movies = if is_csv {
        from_csv(file)?
    } else {
        from_json(BufReader::new(file))?
    };

    tracing::info!(
        path = %path.display(),
        movie_count = movies.len(),
        "Loaded movie dataset"
    );

    Ok(movies)
}

/// Reads a JSON array of movie records
pub fn from_json<R: Read>(reader: R) -> AppResult<Vec<MovieRecord>> {
    let movies: Vec<MovieRecord> = serde_json::from_reader(reader)?;
    Ok(clean_titles(movies))
}

/// Reads CSV with a `title,description,genres,actors,directors` header.
/// Only `title` is required; missing columns are treated as empty.
pub fn from_csv<R: Read>(reader: R) -> AppResult<Vec<MovieRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let has_title = reader.headers()?.iter().any(|h| h == "title");
    if !has_title {
        return Err(AppError::InvalidInput(
            "CSV dataset has no 'title' column".to_string(),
        ));
    }

    let movies = reader
        .deserialize::<MovieRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clean_titles(movies))
}

/// Writes `movies` as a pretty-printed JSON array
pub fn save_json(movies: &[MovieRecord], path: &Path) -> AppResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, movies)?;
    writer.flush()?;
    Ok(())
}

/// Trims titles and drops records left without one
fn clean_titles(movies: Vec<MovieRecord>) -> Vec<MovieRecord> {
    let total = movies.len();
    let kept: Vec<MovieRecord> = movies
        .into_iter()
        .map(|mut m| {
            m.title = m.title.trim().to_string();
            m
        })
        .filter(|m| !m.title.is_empty())
        .collect();
    if kept.len() < total {
        tracing::warn!(dropped = total - kept.len(), "Skipped records without a title");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_with_nulls_and_missing_fields() {
        let json = r#"[
            {"title": "Alien", "description": "Space horror", "genres": "Horror", "actors": null},
            {"title": "Heat"},
            {"title": "  ", "description": "no title"}
        ]"#;
        let movies = from_json(json.as_bytes()).unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].actors, "");
        assert_eq!(movies[0].genres, "Horror");
        assert_eq!(movies[1].description, "");
    }

    #[test]
    fn test_json_titles_are_trimmed() {
        let json = r#"[{"title": " Heat ", "description": "A heist in LA"}]"#;
        let movies = from_json(json.as_bytes()).unwrap();
        assert_eq!(movies[0].title, "Heat");
    }

    #[test]
    fn test_csv_with_quoted_lists() {
        let csv = "title,description,genres,actors,directors\n\
                   Heat,A heist in LA,\"Crime, Thriller\",\"Al Pacino, Robert De Niro\",Michael Mann\n\
                   Up,,Animation,,\n";
        let movies = from_csv(csv.as_bytes()).unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].genres, "Crime, Thriller");
        assert_eq!(movies[0].actors, "Al Pacino, Robert De Niro");
        assert_eq!(movies[1].description, "");
        assert_eq!(movies[1].directors, "");
    }

    #[test]
    fn test_csv_without_optional_columns() {
        let csv = "title,genres\nAlien,Horror\n";
        let movies = from_csv(csv.as_bytes()).unwrap();
        assert_eq!(movies, vec![MovieRecord::new("Alien", "").with_genres("Horror")]);
    }

    #[test]
    fn test_csv_requires_title_column() {
        let csv = "name,genres\nAlien,Horror\n";
        assert!(matches!(
            from_csv(csv.as_bytes()),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let movies = vec![MovieRecord::new("Alien", "Space horror").with_genres("Horror")];

        let json_path = dir.path().join("movies.json");
        save_json(&movies, &json_path).unwrap();
        assert_eq!(load(&json_path).unwrap(), movies);

        let csv_path = dir.path().join("movies.CSV");
        std::fs::write(&csv_path, "title,description,genres\nAlien,Space horror,Horror\n").unwrap();
        assert_eq!(load(&csv_path).unwrap(), movies);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load(Path::new("/nonexistent/movies.json")),
            Err(AppError::Io(_))
        ));
    }
}
