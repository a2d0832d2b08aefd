//! The closed metric registry: canonical metric names, how each resolves
//! against a [`FinancialPeriod`], and the alias table that maps the open
//! vocabulary of free-form claim text onto that closed set.

use std::collections::HashMap;

use claim_auditor_math::margin;
use claim_auditor_model::FinancialPeriod;

/// Every field of [`FinancialPeriod`] that a canonical metric name can
/// resolve to directly or use as an input to a derived ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKey {
    Revenue,
    CostOfRevenue,
    GrossProfit,
    OperatingIncome,
    OperatingExpenses,
    NetIncome,
    EpsBasic,
    EpsDiluted,
    Ebitda,
    ResearchAndDevelopment,
    SellingGeneralAdmin,
    InterestExpense,
    IncomeTaxExpense,
    OperatingCashFlow,
    CapitalExpenditure,
    FreeCashFlow,
    TotalAssets,
    TotalLiabilities,
    TotalDebt,
    CashAndEquivalents,
    ShareholdersEquity,
}

fn field_value(period: &FinancialPeriod, key: FieldKey) -> Option<f64> {
    match key {
        FieldKey::Revenue => period.revenue,
        FieldKey::CostOfRevenue => period.cost_of_revenue,
        FieldKey::GrossProfit => period.gross_profit,
        FieldKey::OperatingIncome => period.operating_income,
        FieldKey::OperatingExpenses => period.operating_expenses,
        FieldKey::NetIncome => period.net_income,
        FieldKey::EpsBasic => period.eps_basic,
        FieldKey::EpsDiluted => period.eps_diluted,
        FieldKey::Ebitda => period.ebitda,
        FieldKey::ResearchAndDevelopment => period.research_and_development,
        FieldKey::SellingGeneralAdmin => period.selling_general_admin,
        FieldKey::InterestExpense => period.interest_expense,
        FieldKey::IncomeTaxExpense => period.income_tax_expense,
        FieldKey::OperatingCashFlow => period.operating_cash_flow,
        // Sources store capex as a negative outflow; claims describe it as a
        // positive spend amount.
        FieldKey::CapitalExpenditure => period.capital_expenditure.map(f64::abs),
        FieldKey::FreeCashFlow => period.free_cash_flow,
        FieldKey::TotalAssets => period.total_assets,
        FieldKey::TotalLiabilities => period.total_liabilities,
        FieldKey::TotalDebt => period.total_debt,
        FieldKey::CashAndEquivalents => period.cash_and_equivalents,
        FieldKey::ShareholdersEquity => period.shareholders_equity,
    }
}

#[derive(Clone)]
enum Mapping {
    Direct(FieldKey),
    Derived {
        numerator: FieldKey,
        denominator: FieldKey,
    },
}

/// The closed set of metrics the verification engine knows how to resolve,
/// plus the alias table that maps free-form extracted metric strings onto
/// that set.
#[derive(Clone)]
pub struct MetricRegistry {
    mappings: HashMap<&'static str, Mapping>,
    aliases: HashMap<String, &'static str>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    pub fn new() -> Self {
        let mut mappings = HashMap::new();
        mappings.insert("revenue", Mapping::Direct(FieldKey::Revenue));
        mappings.insert("cost_of_revenue", Mapping::Direct(FieldKey::CostOfRevenue));
        mappings.insert("gross_profit", Mapping::Direct(FieldKey::GrossProfit));
        mappings.insert("operating_income", Mapping::Direct(FieldKey::OperatingIncome));
        mappings.insert("operating_expenses", Mapping::Direct(FieldKey::OperatingExpenses));
        mappings.insert("net_income", Mapping::Direct(FieldKey::NetIncome));
        mappings.insert("eps", Mapping::Direct(FieldKey::EpsDiluted));
        mappings.insert("eps_basic", Mapping::Direct(FieldKey::EpsBasic));
        mappings.insert("eps_diluted", Mapping::Direct(FieldKey::EpsDiluted));
        mappings.insert("ebitda", Mapping::Direct(FieldKey::Ebitda));
        mappings.insert(
            "research_and_development",
            Mapping::Direct(FieldKey::ResearchAndDevelopment),
        );
        mappings.insert(
            "selling_general_admin",
            Mapping::Direct(FieldKey::SellingGeneralAdmin),
        );
        mappings.insert("interest_expense", Mapping::Direct(FieldKey::InterestExpense));
        mappings.insert("income_tax_expense", Mapping::Direct(FieldKey::IncomeTaxExpense));
        mappings.insert("operating_cash_flow", Mapping::Direct(FieldKey::OperatingCashFlow));
        mappings.insert("capital_expenditure", Mapping::Direct(FieldKey::CapitalExpenditure));
        mappings.insert("free_cash_flow", Mapping::Direct(FieldKey::FreeCashFlow));
        mappings.insert("total_assets", Mapping::Direct(FieldKey::TotalAssets));
        mappings.insert("total_liabilities", Mapping::Direct(FieldKey::TotalLiabilities));
        mappings.insert("total_debt", Mapping::Direct(FieldKey::TotalDebt));
        mappings.insert("cash_and_equivalents", Mapping::Direct(FieldKey::CashAndEquivalents));
        mappings.insert("shareholders_equity", Mapping::Direct(FieldKey::ShareholdersEquity));

        mappings.insert(
            "gross_margin",
            Mapping::Derived {
                numerator: FieldKey::GrossProfit,
                denominator: FieldKey::Revenue,
            },
        );
        mappings.insert(
            "operating_margin",
            Mapping::Derived {
                numerator: FieldKey::OperatingIncome,
                denominator: FieldKey::Revenue,
            },
        );
        mappings.insert(
            "net_margin",
            Mapping::Derived {
                numerator: FieldKey::NetIncome,
                denominator: FieldKey::Revenue,
            },
        );

        let mut aliases = HashMap::new();
        for (alias, canonical) in [
            ("total revenue", "revenue"),
            ("net revenue", "revenue"),
            ("sales", "revenue"),
            ("top line", "revenue"),
            ("cost of goods sold", "cost_of_revenue"),
            ("cogs", "cost_of_revenue"),
            ("gross profit", "gross_profit"),
            ("operating profit", "operating_income"),
            ("operating earnings", "operating_income"),
            ("opex", "operating_expenses"),
            ("operating expenses", "operating_expenses"),
            ("net earnings", "net_income"),
            ("bottom line", "net_income"),
            ("earnings per share", "eps"),
            ("diluted eps", "eps_diluted"),
            ("basic eps", "eps_basic"),
            ("op margin", "operating_margin"),
            ("operating profit margin", "operating_margin"),
            ("gross margin", "gross_margin"),
            ("net margin", "net_margin"),
            ("net profit margin", "net_margin"),
            ("r&d", "research_and_development"),
            ("research and development", "research_and_development"),
            ("sg&a", "selling_general_admin"),
            ("fcf", "free_cash_flow"),
            ("free cash flow", "free_cash_flow"),
            ("capex", "capital_expenditure"),
            ("capital expenditures", "capital_expenditure"),
            ("operating cash flow", "operating_cash_flow"),
            ("cash from operations", "operating_cash_flow"),
            ("total debt", "total_debt"),
            ("cash and cash equivalents", "cash_and_equivalents"),
            ("stockholders equity", "shareholders_equity"),
            ("shareholder equity", "shareholders_equity"),
        ] {
            aliases.insert(alias.to_string(), canonical);
        }

        Self { mappings, aliases }
    }

    /// Lower-cases and trims `name`, then maps it through the alias table.
    /// Names already in canonical form (or unrecognized) pass through
    /// unchanged.
    pub fn normalize(&self, name: &str) -> String {
        let key = name.trim().to_lowercase();
        self.aliases
            .get(key.as_str())
            .map(|canonical| canonical.to_string())
            .unwrap_or(key)
    }

    /// True iff the normalized name has a direct or derived mapping.
    pub fn can_resolve(&self, name: &str) -> bool {
        let canonical = self.normalize(name);
        self.mappings.contains_key(canonical.as_str())
    }

    /// Resolves the normalized name against `period`. Returns `None` when
    /// the metric is unknown, or when a required field is absent from the
    /// period.
    pub fn resolve(&self, name: &str, period: &FinancialPeriod) -> Option<f64> {
        let canonical = self.normalize(name);
        match self.mappings.get(canonical.as_str())? {
            Mapping::Direct(field) => field_value(period, *field),
            Mapping::Derived {
                numerator,
                denominator,
            } => {
                let num = field_value(period, *numerator)?;
                let den = field_value(period, *denominator)?;
                margin(num, den)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> FinancialPeriod {
        FinancialPeriod {
            revenue: Some(1000.0),
            gross_profit: Some(400.0),
            operating_income: Some(200.0),
            net_income: Some(100.0),
            capital_expenditure: Some(-50.0),
            ..Default::default()
        }
    }

    #[test]
    fn direct_resolution() {
        let registry = MetricRegistry::new();
        assert_eq!(registry.resolve("revenue", &period()), Some(1000.0));
    }

    #[test]
    fn capex_resolves_to_absolute_value() {
        let registry = MetricRegistry::new();
        assert_eq!(registry.resolve("capex", &period()), Some(50.0));
    }

    #[test]
    fn derived_margin_resolution() {
        let registry = MetricRegistry::new();
        assert_eq!(registry.resolve("gross_margin", &period()), Some(40.0));
        assert_eq!(registry.resolve("net margin", &period()), Some(10.0));
    }

    #[test]
    fn alias_normalization() {
        let registry = MetricRegistry::new();
        assert_eq!(registry.normalize("Total Revenue"), "revenue");
        assert_eq!(registry.normalize("  FCF "), "free_cash_flow");
    }

    #[test]
    fn unknown_metric_does_not_resolve() {
        let registry = MetricRegistry::new();
        assert!(!registry.can_resolve("daily active users"));
        assert_eq!(registry.resolve("daily active users", &period()), None);
    }

    #[test]
    fn missing_field_yields_none() {
        let registry = MetricRegistry::new();
        let mut p = period();
        p.revenue = None;
        assert_eq!(registry.resolve("gross_margin", &p), None);
    }
}
