//! Property tests for plan eligibility.
//!
//! The catalog listing and the purchase-time check both go through
//! `Plan::is_eligible`; these properties pin down the predicate itself.

use std::collections::HashSet;

use proptest::prelude::*;

use pressabo::domain::catalog::{EligibilityFacts, EligibilityPurpose, Plan, PlanDuration};
use pressabo::domain::foundation::PlanId;

fn arb_purpose() -> impl Strategy<Value = EligibilityPurpose> {
    prop_oneof![
        Just(EligibilityPurpose::Purchase),
        Just(EligibilityPurpose::Renewal),
    ]
}

fn arb_domains() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}\\.example\\.(edu|org)", 0..4)
}

prop_compose! {
    fn arb_plan()(
        purchasable in any::<bool>(),
        renewable in any::<bool>(),
        price in 0u32..500,
        cap in prop_oneof![Just(None), (0u32..4).prop_map(Some)],
        allow_list in prop_oneof![Just(None), arb_domains().prop_map(Some)],
    ) -> Plan {
        Plan {
            id: PlanId::new(),
            slug: "prop".to_string(),
            name: "Prop".to_string(),
            price,
            duration: PlanDuration::Months(12),
            is_purchasable: purchasable,
            is_renewable: renewable,
            eligible_email_domains: allow_list,
            eligible_active_subscriptions_per_user: cap,
            renews_to: None,
        }
    }
}

prop_compose! {
    fn arb_facts()(
        verified in arb_domains(),
        active in 0u32..5,
    ) -> EligibilityFacts {
        EligibilityFacts {
            verified_domains: verified.into_iter().collect::<HashSet<_>>(),
            active_subscriptions_of_plan: active,
        }
    }
}

proptest! {
    /// A retired plan (cap zero) is eligible for nobody, ever.
    #[test]
    fn zero_cap_beats_everything(mut plan in arb_plan(), facts in arb_facts(), purpose in arb_purpose()) {
        plan.eligible_active_subscriptions_per_user = Some(0);
        prop_assert!(!plan.is_eligible(purpose, &facts));
    }

    /// The purpose gate is necessary: a plan closed for the purpose never
    /// passes, whatever the facts say.
    #[test]
    fn purpose_gate_is_necessary(plan in arb_plan(), facts in arb_facts(), purpose in arb_purpose()) {
        let gate = match purpose {
            EligibilityPurpose::Purchase => plan.is_purchasable,
            EligibilityPurpose::Renewal => plan.is_renewable,
        };
        if !gate {
            prop_assert!(!plan.is_eligible(purpose, &facts));
        }
    }

    /// Verifying an additional address can only widen eligibility.
    #[test]
    fn extra_verified_domain_is_monotone(
        plan in arb_plan(),
        facts in arb_facts(),
        purpose in arb_purpose(),
        extra in "[a-z]{1,8}\\.example\\.edu",
    ) {
        let before = plan.is_eligible(purpose, &facts);
        let mut widened = facts.clone();
        widened.verified_domains.insert(extra);
        if before {
            prop_assert!(plan.is_eligible(purpose, &widened));
        }
    }

    /// The cap compares against the active count exactly: under the cap
    /// passes, at or over fails (given the other rules pass).
    #[test]
    fn cap_is_a_strict_threshold(
        mut plan in arb_plan(),
        facts in arb_facts(),
        cap in 1u32..4,
    ) {
        plan.is_purchasable = true;
        plan.eligible_email_domains = None;
        plan.eligible_active_subscriptions_per_user = Some(cap);
        let eligible = plan.is_eligible(EligibilityPurpose::Purchase, &facts);
        prop_assert_eq!(eligible, facts.active_subscriptions_of_plan < cap);
    }

    /// Filtering a catalog with the predicate keeps exactly the plans the
    /// single-plan test accepts, in order.
    #[test]
    fn list_filter_agrees_with_single_plan_test(
        plans in prop::collection::vec(arb_plan(), 0..6),
        facts in arb_facts(),
        purpose in arb_purpose(),
    ) {
        let listed: Vec<&Plan> = plans
            .iter()
            .filter(|p| p.is_eligible(purpose, &facts))
            .collect();
        for plan in &plans {
            let in_list = listed.iter().any(|p| p.id == plan.id);
            prop_assert_eq!(in_list, plan.is_eligible(purpose, &facts));
        }
    }
}
