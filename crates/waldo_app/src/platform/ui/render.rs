use waldo_core::{AppViewModel, ExtractionResults, Phase, ProgressView};

const BAR_WIDTH: usize = 20;

/// Turns successive view models into terminal lines, printing each piece once.
#[derive(Debug, Default)]
pub struct Renderer {
    last_progress: Option<String>,
    last_error: Option<String>,
    results_shown: bool,
}

impl Renderer {
    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        // An errored session is reported by the error line alone.
        if view.progress.visible && view.phase != Phase::Errored {
            let line = progress_line(&view.progress);
            if self.last_progress.as_ref() != Some(&line) {
                lines.push(line.clone());
                self.last_progress = Some(line);
            }
        }

        if let Some(error) = &view.error {
            if self.last_error.as_ref() != Some(error) {
                lines.push(format!("Error: {error}"));
                self.last_error = Some(error.clone());
            }
        }

        if let Some(results) = &view.results {
            if !self.results_shown {
                lines.extend(results_lines(results));
                self.results_shown = true;
            }
        }

        lines
    }
}

pub fn progress_line(progress: &ProgressView) -> String {
    let percent = progress.percent.unwrap_or(0.0).clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let mut line = format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    );
    for part in [&progress.step, &progress.headline, &progress.details]
        .into_iter()
        .flatten()
    {
        line.push_str(" | ");
        line.push_str(part);
    }
    line
}

pub fn results_lines(results: &ExtractionResults) -> Vec<String> {
    let mut lines = Vec::with_capacity(results.locations.len() * 2 + 2);
    let title = results.article_title.as_deref().unwrap_or("Untitled article");
    let noun = if results.locations.len() == 1 {
        "location"
    } else {
        "locations"
    };
    lines.push(format!(
        "{title}: {} {noun} found in {:.2}s",
        results.locations.len(),
        results.processing_time
    ));
    for warning in &results.warnings {
        if warning.message.is_empty() {
            lines.push(format!("Warning: {}", warning.code));
        } else {
            lines.push(format!("Warning: {} ({})", warning.message, warning.code));
        }
    }
    for location in &results.locations {
        lines.push(format!(
            "  - {} ({:.4}, {:.4})",
            location.name, location.latitude, location.longitude
        ));
        if let Some(summary) = location.events_summary.as_deref() {
            if !summary.trim().is_empty() {
                lines.push(format!("      {}", summary.trim()));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use waldo_core::{LocationData, ProcessingWarning, Status};

    use super::*;

    fn streaming_view(percent: f64, item: Option<&str>) -> AppViewModel {
        AppViewModel {
            phase: Phase::Streaming(Status::ProcessingLocations),
            busy: true,
            progress: ProgressView {
                visible: true,
                percent: Some(percent),
                headline: Some("Processing 3 locations".to_string()),
                step: Some(Status::ProcessingLocations.label().to_string()),
                step_status: Some(Status::ProcessingLocations),
                details: item.map(|item| format!("Current: {item}")),
            },
            ..AppViewModel::default()
        }
    }

    #[test]
    fn progress_line_draws_bar_and_parts() {
        let view = streaming_view(50.0, Some("Kyiv"));
        assert_eq!(
            progress_line(&view.progress),
            "[##########----------]  50% | Processing locations | Processing 3 locations | Current: Kyiv"
        );
    }

    #[test]
    fn progress_line_clamps_out_of_range_percent() {
        let mut view = streaming_view(140.0, None);
        assert!(progress_line(&view.progress).starts_with("[####################] 100%"));
        view.progress.percent = Some(-5.0);
        assert!(progress_line(&view.progress).starts_with("[--------------------]   0%"));
    }

    #[test]
    fn unchanged_progress_is_printed_once() {
        let mut renderer = Renderer::default();
        let view = streaming_view(25.0, None);
        assert_eq!(renderer.render(&view).len(), 1);
        assert!(renderer.render(&view).is_empty());
        assert_eq!(renderer.render(&streaming_view(30.0, None)).len(), 1);
    }

    #[test]
    fn errored_view_prints_only_the_error() {
        let mut renderer = Renderer::default();
        let mut view = streaming_view(40.0, None);
        view.phase = Phase::Errored;
        view.busy = false;
        view.error = Some("Connection lost".to_string());
        assert_eq!(renderer.render(&view), vec!["Error: Connection lost".to_string()]);
    }

    #[test]
    fn results_are_listed_once_with_summaries() {
        let mut renderer = Renderer::default();
        let view = AppViewModel {
            phase: Phase::Complete,
            results: Some(ExtractionResults {
                article_title: Some("Spring offensive".to_string()),
                locations: vec![
                    LocationData {
                        name: "Kyiv".to_string(),
                        latitude: 50.4501,
                        longitude: 30.5234,
                        events_summary: Some("Air raid sirens overnight".to_string()),
                    },
                    LocationData {
                        name: "Lviv".to_string(),
                        latitude: 49.8397,
                        longitude: 24.0297,
                        events_summary: None,
                    },
                ],
                processing_time: 3.456,
                warnings: Vec::new(),
            }),
            ..AppViewModel::default()
        };

        assert_eq!(
            renderer.render(&view),
            vec![
                "Spring offensive: 2 locations found in 3.46s".to_string(),
                "  - Kyiv (50.4501, 30.5234)".to_string(),
                "      Air raid sirens overnight".to_string(),
                "  - Lviv (49.8397, 24.0297)".to_string(),
            ]
        );
        assert!(renderer.render(&view).is_empty());
    }

    #[test]
    fn processing_warnings_follow_the_summary_line() {
        let results = ExtractionResults {
            article_title: None,
            locations: Vec::new(),
            processing_time: 0.5,
            warnings: vec![
                ProcessingWarning {
                    code: "TEXT_TRUNCATED".to_string(),
                    message: "Article text was truncated to 50KB for processing".to_string(),
                },
                ProcessingWarning {
                    code: "GEOCODING_FAILED".to_string(),
                    message: String::new(),
                },
            ],
        };

        assert_eq!(
            results_lines(&results),
            vec![
                "Untitled article: 0 locations found in 0.50s".to_string(),
                "Warning: Article text was truncated to 50KB for processing (TEXT_TRUNCATED)"
                    .to_string(),
                "Warning: GEOCODING_FAILED".to_string(),
            ]
        );
    }
}
