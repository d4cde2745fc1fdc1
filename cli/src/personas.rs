use anyhow::Result;
use spookychef_core::{DataSet, Persona};

pub fn run(data: &DataSet, json: bool) -> Result<String> {
    if json {
        let personas: Vec<&Persona> = data.personas.iter().map(|p| p.as_ref()).collect();
        return Ok(serde_json::to_string_pretty(&personas)?);
    }

    Ok(data
        .personas
        .iter()
        .map(|p| {
            let silent = if p.is_silent() { "  [silent]" } else { "" };
            format!("{:<20} {} ({}){}", p.id, p.display_name, p.origin, silent)
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_persona() {
        let data = DataSet::embedded();
        let out = run(&data, false).unwrap();
        assert_eq!(out.lines().count(), data.personas.len());
        assert!(out.lines().any(|l| l.starts_with("art-the-clown") && l.ends_with("[silent]")));

        let json: serde_json::Value = serde_json::from_str(&run(&data, true).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), data.personas.len());
        assert!(json[0]["movieImdbUrl"].is_string());
    }
}
