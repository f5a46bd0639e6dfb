use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

pub const SAMPLE_FILENAME: &str = "sample_data.csv";

/// Demo dataset served by `/sample_data` when no upload exists yet.
const SAMPLE_CSV: &str = "\
Date,Product,Category,Price,Quantity,Revenue,CustomerAge,CustomerGender,Region
2023-01-01,Laptop,Electronics,1200,5,6000,34,M,North
2023-01-02,Phone,Electronics,800,10,8000,25,F,South
2023-01-03,Tablet,Electronics,600,8,4800,42,M,East
2023-01-04,Laptop,Electronics,1300,3,3900,29,F,West
2023-01-05,Phone,Electronics,750,12,9000,37,M,North
2023-01-06,Tablet,Electronics,550,7,3850,45,F,South
2023-01-07,Laptop,Electronics,1250,6,7500,31,M,East
2023-01-08,Phone,Electronics,820,9,7380,28,F,West
2023-01-09,Tablet,Electronics,580,4,2320,40,M,North
2023-01-10,Laptop,Electronics,1350,5,6750,33,F,South
";

pub fn ensure_upload_root(dir: &Path) -> io::Result<PathBuf> {
    ensure_dir(dir)?;
    Ok(dir.to_path_buf())
}

/// Where an upload for the given session lands on disk.
pub fn stored_file_path(upload_dir: &Path, session_id: &Uuid, extension: &str) -> PathBuf {
    upload_dir.join(format!("{}.{}", session_id, extension))
}

pub fn save_upload(path: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::write(path, bytes)
}

/// Write the demo dataset on first use and return its path.
pub fn ensure_sample_dataset(upload_dir: &Path) -> io::Result<PathBuf> {
    let path = upload_dir.join(SAMPLE_FILENAME);
    if !path.exists() {
        fs::write(&path, SAMPLE_CSV)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
