mod subject_files;
