mod one_time_code_tests;
