//! Input path loading and solution output.
use crate::chromosome::Chromosome;
use crate::errors::{Error, Result};
use crate::geometry::{Points, Vec3};
use crate::module_db::ModuleDb;
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load the target path, dispatching on the file extension:
/// `.csv` for space-delimited `x y z` rows, `.json` for `{"coms": [...]}`.
pub fn load_target_path(path: &Path) -> Result<Points> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => {
            info!("using csv input");
            load_csv_path(path)
        }
        Some("json") => {
            info!("using json input");
            load_json_path(path)
        }
        _ => Err(Error::InputFormat(path.display().to_string())),
    }
}

fn load_csv_path(path: &Path) -> Result<Points> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != 3 {
            return Err(Error::InputFormat(format!(
                "row \"{}\" must have 3 components, found {}",
                record.iter().join(" "),
                record.len()
            )));
        }
        let mut parts = [0.0f32; 3];
        for (part, field) in parts.iter_mut().zip(record.iter()) {
            *part = field
                .parse()
                .map_err(|_| Error::InputFormat(format!("bad 3D float component \"{}\"", field)))?;
        }
        points.push(Vec3::new(parts[0], parts[1], parts[2]));
    }
    Ok(points)
}

#[derive(Deserialize)]
struct PathFile {
    coms: Vec<[f32; 3]>,
}

fn load_json_path(path: &Path) -> Result<Points> {
    let text = fs::read_to_string(path)?;
    let file: PathFile = serde_json::from_str(&text)?;
    Ok(file
        .coms
        .iter()
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

#[derive(Serialize)]
struct SolutionJson<'a> {
    nodes: Vec<&'a str>,
    score: f32,
}

/// Write each solution as a JSON `{nodes, score}` description plus a CSV of
/// its chain CoMs, one file pair per solution.
pub fn write_solutions(dir: &Path, db: &ModuleDb, solutions: &[Chromosome]) -> Result<()> {
    fs::create_dir_all(dir)?;

    for (i, chromo) in solutions.iter().enumerate() {
        let solution = SolutionJson {
            nodes: chromo.node_names(db),
            score: chromo.score,
        };
        fs::write(
            dir.join(format!("sol_{}.json", i)),
            serde_json::to_string(&solution)?,
        )?;

        let csv_data = chromo
            .genes
            .iter()
            .map(|g| format!("{}, {}, {}", g.com.x, g.com.y, g.com.z))
            .join("\n");
        fs::write(dir.join(format!("sol_{}.csv", i)), csv_data)?;
    }

    info!("wrote {} solutions to {}", solutions.len(), dir.display());
    Ok(())
}
