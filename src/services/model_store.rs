//! Persistence of the recommendation model as four JSON artifacts.
//!
//! The artifacts are loaded together and validated as a whole; a missing,
//! corrupt or mismatched file fails the load instead of producing a
//! partially usable model.

use ndarray::Array2;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

use super::similarity::SimilarityModel;
use super::tfidf::TfidfVectorizer;

pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
pub const MOVIES_FILE: &str = "movies.json";
pub const TITLE_INDEX_FILE: &str = "title_index.json";
pub const SIMILARITY_FILE: &str = "cosine_sim.json";

/// Writes all four artifacts into `dir`, creating it if needed
pub fn save(model: &SimilarityModel, dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir)?;

    tracing::info!(dir = %dir.display(), "Saving model artifacts");
    write_json(&dir.join(SIMILARITY_FILE), &model.similarity)?;
    write_json(&dir.join(MOVIES_FILE), &model.movies)?;
    write_json(&dir.join(TITLE_INDEX_FILE), &model.title_index)?;
    write_json(&dir.join(VECTORIZER_FILE), &model.vectorizer)?;

    Ok(())
}

/// Loads and validates the four artifacts in `dir`
pub fn load(dir: &Path) -> AppResult<SimilarityModel> {
    let vectorizer: TfidfVectorizer = read_json(&dir.join(VECTORIZER_FILE))?;
    let movies: Vec<MovieRecord> = read_json(&dir.join(MOVIES_FILE))?;
    let title_index: BTreeMap<String, usize> = read_json(&dir.join(TITLE_INDEX_FILE))?;
    let similarity: Array2<f32> = read_json(&dir.join(SIMILARITY_FILE))?;

    let model = SimilarityModel::from_parts(vectorizer, movies, title_index, similarity)?;

    tracing::info!(
        dir = %dir.display(),
        movie_count = model.len(),
        "Loaded recommendation model"
    );

    Ok(model)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let file = File::open(path)
        .map_err(|e| AppError::InvalidModel(format!("{}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::InvalidModel(format!("{}: {}", path.display(), e)))
}

/// Writes to a sibling temp file and renames it over `path`, so readers
/// never observe a half-written artifact
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    let tmp = temp_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), "Wrote artifact");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
