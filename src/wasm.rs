use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn analyze_project_json(source: &str) -> Result<String, JsValue> {
    crate::analyze_project_source(source, crate::report::ReportFormat::Json)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
