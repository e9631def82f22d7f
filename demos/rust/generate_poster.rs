use std::path::Path;

use poster_core::{Column, Poster, PosterConfig, TypesetConfig};

const PREAMBLE: &str = r"
\usepackage{amsmath}
\renewcommand{\familydefault}{\sfdefault}
\newcommand{\highlight}[1]{\textbf{#1}}
";

fn main() {
    poster_demos::ensure_logo(Path::new("images/logo.png")).unwrap();

    let config = PosterConfig {
        output_stem: "poster_output".to_string(),
        ..PosterConfig::new(
            r"\Huge\bfseries Colouring Sparse Graphs",
            r"\Large A. Author, B. Author -- Example University",
        )
    };
    let typeset = TypesetConfig {
        preamble: PREAMBLE.to_string(),
        ..Default::default()
    };
    let mut poster = Poster::new(config, typeset).unwrap();

    let intro = poster
        .render_markup_to_block(
            r"We ask how few colours suffice for graphs with few edges.
            The answer depends on the \highlight{maximum average degree}.

            This poster summarises three results.",
        )
        .unwrap();
    poster.add_box(&intro, Column::Left, "Introduction", false).unwrap();

    let results = poster
        .render_markup_to_block(
            r"\begin{itemize}
            \item Every planar graph is 5-colourable.
            \item Sparse graphs admit \emph{acyclic} colourings.
            \item Bounds are tight up to constants.
            \end{itemize}",
        )
        .unwrap();
    poster.add_box(&results, Column::Right, "Results", false).unwrap();

    let outlook = poster
        .render_markup_to_block(
            r"\begin{center}Questions? Find us at the poster session.\end{center}",
        )
        .unwrap();
    poster.add_box_named(&outlook, "left", "Outlook", false).unwrap();

    let pdf = poster.export_as_pdf().unwrap();
    let eps = poster.export_as_eps().unwrap();
    println!("Generated: {} and {}", pdf.display(), eps.display());
}
