//! Maps raw FMP-shaped statement JSON onto `FinancialPeriodInsert` fields.
//! FMP's own field names (camelCase, several spellings over the years) are
//! translated here rather than exposed through the rest of the system.

use serde_json::Value;

fn matches_period(record: &Value, fiscal_year: i32, fiscal_quarter: i32) -> bool {
    let period_matches = record
        .get("period")
        .and_then(Value::as_str)
        .map(|p| p.eq_ignore_ascii_case(&format!("q{fiscal_quarter}")))
        .unwrap_or(false);
    let year_matches = record
        .get("date")
        .and_then(Value::as_str)
        .and_then(|d| d.get(0..4))
        .and_then(|y| y.parse::<i32>().ok())
        .map(|y| y == fiscal_year)
        .unwrap_or(false);
    period_matches && year_matches
}

fn find_record(records: &[Value], fiscal_year: i32, fiscal_quarter: i32) -> Option<&Value> {
    records.iter().find(|r| matches_period(r, fiscal_year, fiscal_quarter))
}

fn field(record: &Value, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|name| record.get(*name).and_then(Value::as_f64))
}

pub struct IncomeStatementFields {
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
}

pub fn income_fields(records: &[Value], fiscal_year: i32, fiscal_quarter: i32) -> Option<IncomeStatementFields> {
    let record = find_record(records, fiscal_year, fiscal_quarter)?;
    Some(IncomeStatementFields {
        revenue: field(record, &["revenue"]),
        cost_of_revenue: field(record, &["costOfRevenue"]),
        gross_profit: field(record, &["grossProfit"]),
        operating_income: field(record, &["operatingIncome"]),
        operating_expenses: field(record, &["operatingExpenses"]),
        net_income: field(record, &["netIncome"]),
        eps_basic: field(record, &["eps"]),
        eps_diluted: field(record, &["epsdiluted", "epsDiluted"]),
        ebitda: field(record, &["ebitda"]),
        research_and_development: field(record, &["researchAndDevelopmentExpenses"]),
        selling_general_admin: field(record, &["sellingGeneralAndAdministrativeExpenses"]),
        interest_expense: field(record, &["interestExpense"]),
        income_tax_expense: field(record, &["incomeTaxExpense"]),
    })
}

pub struct CashFlowFields {
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

pub fn cash_flow_fields(records: &[Value], fiscal_year: i32, fiscal_quarter: i32) -> Option<CashFlowFields> {
    let record = find_record(records, fiscal_year, fiscal_quarter)?;
    Some(CashFlowFields {
        operating_cash_flow: field(record, &["operatingCashFlow"]),
        capital_expenditure: field(record, &["capitalExpenditure"]),
        free_cash_flow: field(record, &["freeCashFlow"]),
    })
}

pub struct BalanceSheetFields {
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub shareholders_equity: Option<f64>,
}

pub fn balance_sheet_fields(records: &[Value], fiscal_year: i32, fiscal_quarter: i32) -> Option<BalanceSheetFields> {
    let record = find_record(records, fiscal_year, fiscal_quarter)?;
    Some(BalanceSheetFields {
        total_assets: field(record, &["totalAssets"]),
        total_liabilities: field(record, &["totalLiabilities"]),
        total_debt: field(record, &["totalDebt"]),
        cash_and_equivalents: field(record, &["cashAndCashEquivalents"]),
        shareholders_equity: field(record, &["totalStockholdersEquity"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_matching_quarter() {
        let records = vec![
            json!({"date": "2024-03-31", "period": "Q1", "revenue": 100.0}),
            json!({"date": "2023-12-31", "period": "Q4", "revenue": 90.0}),
        ];
        let parsed = income_fields(&records, 2024, 1).unwrap();
        assert_eq!(parsed.revenue, Some(100.0));
    }

    #[test]
    fn returns_none_when_no_matching_period() {
        let records = vec![json!({"date": "2023-12-31", "period": "Q4", "revenue": 90.0})];
        assert!(income_fields(&records, 2024, 1).is_none());
    }
}
