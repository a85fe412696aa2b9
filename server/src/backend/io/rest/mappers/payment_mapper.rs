use crate::backend::domain::{
    commands::{expenses::SaveExpenseCommand, visit_payments::SaveVisitPaymentCommand},
    models::{
        expense::Expense as DomainExpense, payment_method::PaymentMethod as DomainPaymentMethod,
        visit_payment::VisitPayment as DomainVisitPayment,
    },
};
use shared::{
    Expense as SharedExpense, ExpenseRequest, PaymentMethod as SharedPaymentMethod,
    VisitPayment as SharedVisitPayment, VisitPaymentRequest,
};

/// Maps visit payments and expenses between the API and the domain
pub struct PaymentMapper;

impl PaymentMapper {
    pub fn to_visit_payment_command(request: VisitPaymentRequest) -> SaveVisitPaymentCommand {
        SaveVisitPaymentCommand {
            date: request.date,
            patient_name: request.patient_name,
            amount: request.amount,
            method: Self::to_domain_method(request.method),
            description: request.description,
        }
    }

    pub fn to_visit_payment_dto(domain: DomainVisitPayment) -> SharedVisitPayment {
        SharedVisitPayment {
            id: domain.id,
            date: domain.date,
            patient_name: domain.patient_name,
            amount: domain.amount,
            method: Self::to_dto_method(domain.method),
            description: domain.description,
        }
    }

    pub fn to_expense_command(request: ExpenseRequest) -> SaveExpenseCommand {
        SaveExpenseCommand {
            date: request.date,
            vendor: request.vendor,
            amount: request.amount,
            method: Self::to_domain_method(request.method),
            description: request.description,
        }
    }

    pub fn to_expense_dto(domain: DomainExpense) -> SharedExpense {
        SharedExpense {
            id: domain.id,
            date: domain.date,
            vendor: domain.vendor,
            amount: domain.amount,
            method: Self::to_dto_method(domain.method),
            description: domain.description,
        }
    }

    fn to_domain_method(dto: SharedPaymentMethod) -> DomainPaymentMethod {
        match dto {
            SharedPaymentMethod::Cash => DomainPaymentMethod::Cash,
            SharedPaymentMethod::Card => DomainPaymentMethod::Card,
            SharedPaymentMethod::Transfer => DomainPaymentMethod::Transfer,
        }
    }

    fn to_dto_method(domain: DomainPaymentMethod) -> SharedPaymentMethod {
        match domain {
            DomainPaymentMethod::Cash => SharedPaymentMethod::Cash,
            DomainPaymentMethod::Card => SharedPaymentMethod::Card,
            DomainPaymentMethod::Transfer => SharedPaymentMethod::Transfer,
        }
    }
}
