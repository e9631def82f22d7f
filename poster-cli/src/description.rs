use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use poster_core::{Column, Poster, PosterConfig, TypesetConfig};

/// A poster described in TOML: `[poster]`, `[typeset]` and any number
/// of `[[box]]` tables, placed in file order.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PosterDescription {
    pub poster: PosterConfig,
    pub typeset: TypesetConfig,
    #[serde(rename = "box")]
    pub boxes: Vec<BoxSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxSpec {
    pub column: String,
    pub title: String,
    /// Inline markup.
    pub markup: Option<String>,
    /// Markup file, relative to the description file.
    pub markup_file: Option<PathBuf>,
    #[serde(default)]
    pub draw_bbox: bool,
}

impl PosterDescription {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut description: PosterDescription = toml::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for spec in &mut description.boxes {
            if let Some(file) = spec.markup_file.take() {
                spec.markup_file = Some(base.join(file));
            }
        }
        Ok(description)
    }

    /// Build the poster and place every box.
    pub fn build(&self, draw_bbox: bool) -> Result<Poster> {
        let mut poster = Poster::new(self.poster.clone(), self.typeset.clone())
            .context("failed to create poster")?;
        for (index, spec) in self.boxes.iter().enumerate() {
            let column: Column = spec
                .column
                .parse()
                .with_context(|| format!("box {} ({:?})", index + 1, spec.title))?;
            let markup = spec.markup_source()?;
            let block = poster
                .render_markup_to_block(&markup)
                .with_context(|| format!("failed to typeset box {:?}", spec.title))?;
            poster.add_box(&block, column, &spec.title, draw_bbox || spec.draw_bbox)?;
        }
        Ok(poster)
    }
}

impl BoxSpec {
    fn markup_source(&self) -> Result<String> {
        match (&self.markup, &self.markup_file) {
            (Some(markup), None) => Ok(markup.clone()),
            (None, Some(file)) => fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display())),
            (Some(_), Some(_)) => bail!("box {:?} has both markup and markup_file", self.title),
            (None, None) => bail!("box {:?} has neither markup nor markup_file", self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = r#"
        [poster]
        title = "Graph Colouring"
        width = 840.0

        [typeset]
        preamble = '\newcommand{\R}{\textbf{R}}'
        scale = 4.0

        [[box]]
        column = "left"
        title = "Intro"
        markup = 'We study \R.'

        [[box]]
        column = "Right"
        title = "Method"
        markup_file = "method.tex"
    "#;

    #[test]
    fn parses_tables_and_resolves_markup_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poster.toml");
        fs::write(&path, DESCRIPTION).unwrap();
        let description = PosterDescription::load(&path).unwrap();
        assert_eq!(description.poster.title, "Graph Colouring");
        assert_eq!(description.poster.height, 1200.0);
        assert_eq!(description.boxes.len(), 2);
        assert_eq!(
            description.boxes[1].markup_file.as_deref(),
            Some(dir.path().join("method.tex").as_path())
        );
    }

    #[test]
    fn box_needs_exactly_one_markup_source() {
        let spec = BoxSpec {
            column: "left".into(),
            title: "T".into(),
            markup: None,
            markup_file: None,
            draw_bbox: false,
        };
        assert!(spec.markup_source().is_err());
    }

    #[test]
    fn unknown_box_keys_are_rejected() {
        let err = toml::from_str::<PosterDescription>(
            "[[box]]\ncolumn = \"left\"\ntitle = \"T\"\ncolour = \"red\"\n",
        );
        assert!(err.is_err());
    }
}
