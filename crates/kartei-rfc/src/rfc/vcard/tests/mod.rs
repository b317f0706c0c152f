//! Cross-module vCard tests: fixtures, round trips and end-to-end scenarios.
