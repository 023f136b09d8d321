use std::path::Path;
use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_files::{load_object_from_file, load_object_from_json_string, load_object_from_ron_string, load_object_from_toml_string};

pub trait ToAndFromRonString: Serialize + DeserializeOwned {
    fn convert_to_ron_string(&self) -> String {
        ron::to_string(self).unwrap_or_default()
    }
    fn load_from_ron_string(ron_string: &str) -> Result<Self, OptimaError> where Self: Sized {
        load_object_from_ron_string(ron_string)
    }
}
impl <T> ToAndFromRonString for T where T: Serialize + DeserializeOwned {  }

pub trait ToAndFromJsonString: Serialize + DeserializeOwned {
    fn convert_to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
    fn load_from_json_string(json_str: &str) -> Result<Self, OptimaError> where Self: Sized {
        load_object_from_json_string(json_str)
    }
}
impl <T> ToAndFromJsonString for T where T: Serialize + DeserializeOwned {  }

pub trait ToAndFromTomlString: Serialize + DeserializeOwned {
    fn convert_to_toml_string(&self) -> Result<String, OptimaError> {
        return match toml::to_string(self) {
            Ok(s) => { Ok(s) }
            Err(e) => { Err(OptimaError::new_generic_error_str(&format!("Could not serialize to toml: {}", e), file!(), line!())) }
        }
    }
    fn load_from_toml_string(toml_str: &str) -> Result<Self, OptimaError> where Self: Sized {
        load_object_from_toml_string(toml_str)
    }
}
impl <T> ToAndFromTomlString for T where T: Serialize + DeserializeOwned {  }

pub trait LoadableFromFile: DeserializeOwned {
    fn load_from_file(path: &Path) -> Result<Self, OptimaError> where Self: Sized {
        load_object_from_file(path)
    }
}
impl <T> LoadableFromFile for T where T: DeserializeOwned {  }
