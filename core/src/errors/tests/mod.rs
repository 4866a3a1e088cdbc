mod error_type_tests;
