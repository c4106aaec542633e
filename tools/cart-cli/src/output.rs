//! Output formatting for the CLI.

use std::time::Duration;

use cart_core::price::format_price;
use cart_store::{Cart, Notice, NoticeKind};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output handler for CLI messages.
#[derive(Debug, Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  ").trim_end());
    }

    /// Show a store notice. Stock problems are warnings, failures are errors.
    pub fn notice(&self, notice: &Notice) {
        match notice.kind {
            NoticeKind::OutOfStock => self.warn(&notice.message),
            _ if self.json => {}
            _ => eprintln!("{} {}", style("✗").red(), style(&notice.message).red()),
        }
    }

    /// Print the cart as a table with a total line.
    pub fn cart(&self, cart: &Cart) {
        if self.json {
            return;
        }
        if cart.is_empty() {
            self.info("Your cart is empty");
            return;
        }

        let widths = [6, title_width(cart), 6, 14, 14];
        self.table_row(&["ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"], &widths);
        for product in cart {
            let id = product.id.to_string();
            let amount = product.amount.to_string();
            let price = format_price(product.price);
            let subtotal = format_price(product.subtotal());
            self.table_row(
                &[&id, &product.title, &amount, &price, &subtotal],
                &widths,
            );
        }
        println!();
        self.kv("Items", &cart.item_count().to_string());
        self.kv("Total", &style(format_price(cart.subtotal())).bold().to_string());
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

fn title_width(cart: &Cart) -> usize {
    cart.iter()
        .map(|p| p.title.chars().count())
        .max()
        .unwrap_or(0)
        .clamp("PRODUCT".len(), 40)
}
