use serde::{Deserialize, Serialize};

/// One reporting period's structured financials for a company, in native
/// dollars (or native units for per-share figures). Every numeric field is
/// optional: the upstream statement provider does not guarantee completeness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialPeriod {
    pub id: Option<i64>,
    pub company_id: i64,
    pub fiscal_year: i32,
    pub fiscal_quarter: i32,

    // Income statement
    pub revenue: Option<f64>,
    pub cost_of_revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub net_income: Option<f64>,
    pub eps_basic: Option<f64>,
    pub eps_diluted: Option<f64>,
    pub ebitda: Option<f64>,
    pub research_and_development: Option<f64>,
    pub selling_general_admin: Option<f64>,
    pub interest_expense: Option<f64>,
    pub income_tax_expense: Option<f64>,

    // Cash flow statement
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub free_cash_flow: Option<f64>,

    // Balance sheet
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub shareholders_equity: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialPeriodInsert {
    pub company_id: i64,
    pub fiscal_year: i32,
    pub fiscal_quarter: i32,
    pub revenue: Option<f64>,
    pub cost_of_revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub net_income: Option<f64>,
    pub eps_basic: Option<f64>,
    pub eps_diluted: Option<f64>,
    pub ebitda: Option<f64>,
    pub research_and_development: Option<f64>,
    pub selling_general_admin: Option<f64>,
    pub interest_expense: Option<f64>,
    pub income_tax_expense: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub shareholders_equity: Option<f64>,
}

impl From<FinancialPeriod> for FinancialPeriodInsert {
    fn from(p: FinancialPeriod) -> Self {
        Self {
            company_id: p.company_id,
            fiscal_year: p.fiscal_year,
            fiscal_quarter: p.fiscal_quarter,
            revenue: p.revenue,
            cost_of_revenue: p.cost_of_revenue,
            gross_profit: p.gross_profit,
            operating_income: p.operating_income,
            operating_expenses: p.operating_expenses,
            net_income: p.net_income,
            eps_basic: p.eps_basic,
            eps_diluted: p.eps_diluted,
            ebitda: p.ebitda,
            research_and_development: p.research_and_development,
            selling_general_admin: p.selling_general_admin,
            interest_expense: p.interest_expense,
            income_tax_expense: p.income_tax_expense,
            operating_cash_flow: p.operating_cash_flow,
            capital_expenditure: p.capital_expenditure,
            free_cash_flow: p.free_cash_flow,
            total_assets: p.total_assets,
            total_liabilities: p.total_liabilities,
            total_debt: p.total_debt,
            cash_and_equivalents: p.cash_and_equivalents,
            shareholders_equity: p.shareholders_equity,
        }
    }
}

/// Key identifying a single reporting period, used to address the
/// comparison lookups the verification engine needs (current quarter,
/// year-ago quarter, prior quarter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub fiscal_year: i32,
    pub fiscal_quarter: i32,
}

impl PeriodKey {
    pub fn new(fiscal_year: i32, fiscal_quarter: i32) -> Self {
        Self {
            fiscal_year,
            fiscal_quarter,
        }
    }

    /// The same quarter, one year earlier.
    pub fn year_ago(self) -> Self {
        Self::new(self.fiscal_year - 1, self.fiscal_quarter)
    }

    /// The immediately preceding quarter, wrapping Q1 to Q4 of the prior year.
    pub fn prior_quarter(self) -> Self {
        if self.fiscal_quarter == 1 {
            Self::new(self.fiscal_year - 1, 4)
        } else {
            Self::new(self.fiscal_year, self.fiscal_quarter - 1)
        }
    }
}
