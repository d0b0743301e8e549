use serde::{Deserialize, Serialize};

use emall_core::{AggregateRoot, DomainError, DomainResult, OptionId, ProductId};

/// How a product's stock is broken down across its option variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionsType {
    /// No option variants.
    #[default]
    None,
    /// A single option axis; stock is tracked on the product only.
    Single,
    /// Stock is tracked per option variant (in addition to the product total).
    Combination,
}

/// Stock-status marker of an option. Present means the option is stock-tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusOfStock {
    OnSale,
    SoldOut,
}

/// Option variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub option_id: OptionId,
    #[serde(default)]
    pub option_name1: Option<String>,
    #[serde(default)]
    pub option_value1: Option<String>,
    pub stock_count: i64,
    #[serde(default)]
    pub status_of_stock: Option<StatusOfStock>,
}

impl ProductOption {
    pub fn is_stock_tracked(&self) -> bool {
        self.status_of_stock.is_some()
    }
}

/// Command: RegisterProduct (catalog seeding / admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProduct {
    pub product_id: ProductId,
    pub name: String,
    pub stock_count: i64,
    #[serde(default)]
    pub options_type: OptionsType,
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

/// A single quantity to take out of a product (and optionally one of its options).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDecrement {
    pub option_id: Option<OptionId>,
    pub quantity: i64,
}

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    stock_count: i64,
    options_type: OptionsType,
    options: Vec<ProductOption>,
    version: u64,
}

impl Product {
    /// Validate a registration command and build the product at version 1.
    pub fn register(cmd: &RegisterProduct) -> DomainResult<Self> {
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.stock_count < 0 {
            return Err(DomainError::validation("stock count cannot be negative"));
        }

        let mut seen = Vec::with_capacity(cmd.options.len());
        for option in &cmd.options {
            if option.stock_count < 0 {
                return Err(DomainError::validation(format!(
                    "option {} stock count cannot be negative",
                    option.option_id
                )));
            }
            if seen.contains(&option.option_id) {
                return Err(DomainError::validation(format!(
                    "duplicate option id {}",
                    option.option_id
                )));
            }
            seen.push(option.option_id);
        }

        Ok(Self {
            id: cmd.product_id,
            name: cmd.name.clone(),
            stock_count: cmd.stock_count,
            options_type: cmd.options_type,
            options: cmd.options.clone(),
            version: 1,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock_count(&self) -> i64 {
        self.stock_count
    }

    pub fn options_type(&self) -> OptionsType {
        self.options_type
    }

    pub fn options(&self) -> &[ProductOption] {
        &self.options
    }

    pub fn has_combination_options(&self) -> bool {
        self.options_type == OptionsType::Combination
    }

    /// The option with `option_id`, provided it carries a stock-status marker.
    pub fn tracked_option(&self, option_id: OptionId) -> Option<&ProductOption> {
        self.options
            .iter()
            .find(|o| o.option_id == option_id && o.is_stock_tracked())
    }

    /// Apply a batch of decrements all-or-nothing and bump the version.
    ///
    /// Option stock only moves for tracked options of `Combination` products.
    /// Fails with a conflict if any count would go negative; `self` is left
    /// untouched in that case.
    pub fn apply_decrements(&mut self, decrements: &[StockDecrement]) -> DomainResult<()> {
        let mut stock_count = self.stock_count;
        let mut options = self.options.clone();

        for dec in decrements {
            if dec.quantity <= 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
            stock_count = stock_count
                .checked_sub(dec.quantity)
                .ok_or_else(|| self.below_zero(None))?;

            if self.options_type != OptionsType::Combination {
                continue;
            }
            let Some(option_id) = dec.option_id else {
                continue;
            };
            if let Some(option) = options
                .iter_mut()
                .find(|o| o.option_id == option_id && o.is_stock_tracked())
            {
                option.stock_count = option
                    .stock_count
                    .checked_sub(dec.quantity)
                    .filter(|left| *left >= 0)
                    .ok_or_else(|| self.below_zero(Some(option_id)))?;
            }
        }

        if stock_count < 0 {
            return Err(self.below_zero(None));
        }

        self.stock_count = stock_count;
        self.options = options;
        self.version += 1;
        Ok(())
    }

    fn below_zero(&self, option_id: Option<OptionId>) -> DomainError {
        match option_id {
            Some(option_id) => DomainError::conflict(format!(
                "option {option_id} of product {} would drop below zero",
                self.id
            )),
            None => DomainError::conflict(format!("product {} would drop below zero", self.id)),
        }
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
