// Built-in demo datasets, one per topic.

use super::{ChartDataset, ChartType, Color, Series};
use std::collections::BTreeMap;

const PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn palette(count: usize) -> Color {
    Color::PerLabel(
        PALETTE
            .iter()
            .cycle()
            .take(count)
            .map(|c| c.to_string())
            .collect(),
    )
}

fn single(label: &str, values: Vec<f64>, color: &str) -> Series {
    Series {
        label: label.to_string(),
        values,
        background_color: Some(Color::Single(format!("{}80", color))),
        border_color: Some(Color::Single(color.to_string())),
    }
}

fn per_label(label: &str, values: Vec<f64>) -> Series {
    let count = values.len();
    Series {
        label: label.to_string(),
        values,
        background_color: Some(palette(count)),
        border_color: None,
    }
}

fn sales_by_month() -> ChartDataset {
    ChartDataset {
        chart_type: ChartType::Line,
        labels: labels(&[
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ]),
        series: vec![single(
            "Sales",
            vec![
                45000.0, 52000.0, 48000.0, 61000.0, 55000.0, 67000.0, 72000.0, 69000.0, 78000.0,
                82000.0, 95000.0, 110000.0,
            ],
            PALETTE[0],
        )],
    }
}

fn sales_by_category() -> ChartDataset {
    ChartDataset {
        chart_type: ChartType::Doughnut,
        labels: labels(&["Electronics", "Clothing", "Home", "Books", "Sports", "Beauty"]),
        series: vec![per_label(
            "Sales by category",
            vec![320000.0, 185000.0, 142000.0, 68000.0, 97000.0, 121000.0],
        )],
    }
}

fn top_products() -> ChartDataset {
    ChartDataset {
        chart_type: ChartType::Bar,
        labels: labels(&[
            "Wireless Earbuds",
            "Smartphone X",
            "Running Shoes",
            "Coffee Maker",
            "Laptop Pro 14",
            "Yoga Mat",
            "Smart Watch",
            "Desk Lamp",
            "Backpack",
            "Bluetooth Speaker",
        ]),
        series: vec![single(
            "Units sold",
            vec![
                1520.0, 1340.0, 1180.0, 960.0, 890.0, 845.0, 780.0, 720.0, 655.0, 610.0,
            ],
            PALETTE[1],
        )],
    }
}

fn users_by_city() -> ChartDataset {
    ChartDataset {
        chart_type: ChartType::Pie,
        labels: labels(&[
            "Beijing", "Shanghai", "Guangzhou", "Shenzhen", "Hangzhou", "Chengdu", "Wuhan",
            "Nanjing", "Xi'an", "Chongqing",
        ]),
        series: vec![per_label(
            "Users",
            vec![
                2350.0, 2180.0, 1620.0, 1540.0, 1120.0, 980.0, 760.0, 690.0, 540.0, 510.0,
            ],
        )],
    }
}

fn users_by_age() -> ChartDataset {
    ChartDataset {
        chart_type: ChartType::Bar,
        labels: labels(&["18-24", "25-34", "35-44", "45-54", "55-64", "65+"]),
        series: vec![single(
            "Users",
            vec![1850.0, 4200.0, 3100.0, 1650.0, 820.0, 310.0],
            PALETTE[3],
        )],
    }
}

fn orders_by_status() -> ChartDataset {
    ChartDataset {
        chart_type: ChartType::Doughnut,
        labels: labels(&["Completed", "Shipped", "Processing", "Pending", "Cancelled"]),
        series: vec![per_label(
            "Orders",
            vec![6820.0, 1240.0, 530.0, 310.0, 260.0],
        )],
    }
}

fn sales_by_quarter() -> ChartDataset {
    ChartDataset {
        chart_type: ChartType::Bar,
        labels: labels(&["Q1", "Q2", "Q3", "Q4"]),
        series: vec![
            single("2023", vec![128000.0, 156000.0, 171000.0, 214000.0], PALETTE[4]),
            single("2024", vec![145000.0, 183000.0, 219000.0, 287000.0], PALETTE[5]),
        ],
    }
}

fn payments_by_method() -> ChartDataset {
    ChartDataset {
        chart_type: ChartType::Pie,
        labels: labels(&["Alipay", "WeChat Pay", "Credit Card", "Bank Transfer", "Cash on Delivery"]),
        series: vec![per_label(
            "Payments",
            vec![4210.0, 3680.0, 1240.0, 430.0, 260.0],
        )],
    }
}

/// Demo datasets keyed by topic name.
pub fn default_datasets() -> BTreeMap<String, ChartDataset> {
    let mut datasets = BTreeMap::new();
    datasets.insert("sales_by_month".to_string(), sales_by_month());
    datasets.insert("sales_by_category".to_string(), sales_by_category());
    datasets.insert("top_products".to_string(), top_products());
    datasets.insert("users_by_city".to_string(), users_by_city());
    datasets.insert("users_by_age".to_string(), users_by_age());
    datasets.insert("orders_by_status".to_string(), orders_by_status());
    datasets.insert("sales_by_quarter".to_string(), sales_by_quarter());
    datasets.insert("payments_by_method".to_string(), payments_by_method());
    datasets
}
