use serde::Serialize;

/// One cell of the dense correlation matrix.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationCell {
    pub x: String,
    pub y: String,
    pub value: f64,
}

/// One equal-width histogram bin, labeled `"{low:.2}-{high:.2}"`.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub bin: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Chart-ready aggregate. Serialized as `type`, `title`, `data`, plus the
/// field-name keys the chart renderer uses to pick its axes; the category
/// chart keeps the `pie` wire name the renderer dispatches on.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum VisualizationSpec {
    #[serde(rename = "heatmap")]
    Heatmap {
        title: String,
        data: Vec<CorrelationCell>,
        x_field: &'static str,
        y_field: &'static str,
        value_field: &'static str,
    },
    #[serde(rename = "histogram")]
    Histogram {
        title: String,
        data: Vec<HistogramBin>,
        x_field: &'static str,
        y_field: &'static str,
    },
    #[serde(rename = "pie")]
    CategoryCounts {
        title: String,
        data: Vec<CategoryCount>,
        category_field: &'static str,
        value_field: &'static str,
    },
}

impl VisualizationSpec {
    pub fn heatmap(title: String, data: Vec<CorrelationCell>) -> Self {
        VisualizationSpec::Heatmap {
            title,
            data,
            x_field: "x",
            y_field: "y",
            value_field: "value",
        }
    }

    pub fn histogram(title: String, data: Vec<HistogramBin>) -> Self {
        VisualizationSpec::Histogram {
            title,
            data,
            x_field: "bin",
            y_field: "count",
        }
    }

    pub fn category_counts(title: String, data: Vec<CategoryCount>) -> Self {
        VisualizationSpec::CategoryCounts {
            title,
            data,
            category_field: "category",
            value_field: "count",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            VisualizationSpec::Heatmap { title, .. } => title,
            VisualizationSpec::Histogram { title, .. } => title,
            VisualizationSpec::CategoryCounts { title, .. } => title,
        }
    }
}
