use std::fs::File;
use std::io::Read;
use std::path::Path;
use serde::de::DeserializeOwned;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;

pub fn read_file_contents_to_string(path: &Path) -> Result<String, OptimaError> {
    let mut file = match File::open(path) {
        Ok(f) => { f }
        Err(e) => {
            return Err(OptimaError::new_generic_error_str(&format!("Could not open file {:?}: {}", path, e), file!(), line!()));
        }
    };

    let mut contents = String::new();
    let res = file.read_to_string(&mut contents);
    return match res {
        Ok(_) => { Ok(contents) }
        Err(e) => {
            Err(OptimaError::new_generic_error_str(&format!("Could not read file {:?}: {}", path, e), file!(), line!()))
        }
    }
}

pub fn load_object_from_json_string<T: DeserializeOwned>(json_str: &str) -> Result<T, OptimaError> {
    let o_res = serde_json::from_str(json_str);
    return match o_res {
        Ok(o) => { Ok(o) }
        Err(e) => {
            optima_print(json_str, PrintMode::Println, PrintColor::Red, false);
            Err(OptimaError::new_generic_error_str(&format!("load_object_from_json_string() failed.  The given json_string is incompatible with the requested type ({}).", e), file!(), line!()))
        }
    }
}

pub fn load_object_from_ron_string<T: DeserializeOwned>(ron_str: &str) -> Result<T, OptimaError> {
    let o_res = ron::from_str(ron_str);
    return match o_res {
        Ok(o) => { Ok(o) }
        Err(e) => {
            optima_print(ron_str, PrintMode::Println, PrintColor::Red, false);
            Err(OptimaError::new_generic_error_str(&format!("load_object_from_ron_string() failed.  The given ron string is incompatible with the requested type ({}).", e), file!(), line!()))
        }
    }
}

pub fn load_object_from_toml_string<T: DeserializeOwned>(toml_str: &str) -> Result<T, OptimaError> {
    let o_res = toml::from_str(toml_str);
    return match o_res {
        Ok(o) => { Ok(o) }
        Err(e) => {
            optima_print(toml_str, PrintMode::Println, PrintColor::Red, false);
            Err(OptimaError::new_generic_error_str(&format!("load_object_from_toml_string() failed.  The given toml string is incompatible with the requested type ({}).", e), file!(), line!()))
        }
    }
}

/// Loads an object from a json, ron, or toml file.  The format is chosen by the file extension.
pub fn load_object_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, OptimaError> {
    let contents = read_file_contents_to_string(path)?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    return match extension {
        "json" => { load_object_from_json_string(&contents) }
        "ron" => { load_object_from_ron_string(&contents) }
        "toml" => { load_object_from_toml_string(&contents) }
        _ => {
            Err(OptimaError::new_generic_error_str(&format!("Unsupported file extension {:?} for file {:?}.", extension, path), file!(), line!()))
        }
    }
}
